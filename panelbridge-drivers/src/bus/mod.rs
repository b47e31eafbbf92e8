//! Bus adapters

pub mod blocking;

pub use blocking::{BlockingMaster, MasterError};
