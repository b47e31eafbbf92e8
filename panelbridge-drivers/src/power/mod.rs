//! Panel power drivers

pub mod gpio;

pub use gpio::GpioPanelPower;
