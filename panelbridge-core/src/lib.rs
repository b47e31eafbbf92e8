//! Board-agnostic core logic for the panelbridge firmware
//!
//! The bridge exposes a 16x2 character LCD and a 4x4 keypad to an external
//! I2C master as one flat register block. This crate holds everything that
//! does not touch a specific chip:
//!
//! - Reentrant critical section and interrupt-shared state cell
//! - Register map layout, validation and read/write semantics
//! - I2C slave protocol engine (address byte, auto-increment, NACK policy)
//! - Coalescing event set and application status
//! - Keypad matrix scan, debounce and capture buffer
//! - Timer tick handler
//! - Dispatcher turning pending events into LCD operations
//! - Hardware abstraction traits for the LCD and panel power

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod critical;
pub mod dispatch;
pub mod events;
pub mod keypad;
pub mod protocol;
pub mod register;
pub mod state;
pub mod timer;
pub mod traits;
