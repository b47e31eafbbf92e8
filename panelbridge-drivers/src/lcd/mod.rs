//! Character LCD drivers

pub mod st7032;

pub use st7032::{St7032, St7032Error, ST7032_ADDR};
