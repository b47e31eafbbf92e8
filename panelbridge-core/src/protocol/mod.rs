//! I2C slave protocol engine
//!
//! Turns the slave event stream into register reads and writes:
//!
//! ```text
//! write: START  ADDR+W  map_addr  data*      STOP
//! read:  START  ADDR+R  data*  (NACK)        STOP
//! ```
//!
//! The first byte after ADDR+W selects the register; every accepted byte
//! afterwards moves the cursor forward by one. Reads continue from wherever
//! the cursor was left. A refused byte is NACKed and the cursor stays put.

use crate::register::MAP_SIZE;

mod engine;
mod handler;

/// Longest useful master write: the address byte plus the whole map
pub const MAX_WRITE_LEN: usize = MAP_SIZE as usize + 1;

pub use engine::SlaveEngine;
pub use handler::SharedSlave;
