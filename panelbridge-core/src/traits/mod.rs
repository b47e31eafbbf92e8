//! Hardware abstraction traits
//!
//! These traits define the interface between the bridge logic and the
//! panel hardware it drives.

pub mod lcd;
pub mod power;

pub use lcd::LcdController;
pub use power::PanelPower;
