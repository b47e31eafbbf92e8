//! Panelbridge Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the bridge logic is
//! written against. Chip support (currently the RP2040 firmware crate)
//! implements them, and host tests implement them with mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  panelbridge-firmware (RP2040/embassy)  │
//! └─────────────────────────────────────────┘
//!            │                    │
//!            ▼                    ▼
//! ┌───────────────────┐  ┌───────────────────┐
//! │ panelbridge-core  │  │ panelbridge-      │
//! │ (register map,    │◄─│ drivers (ST7032,  │
//! │  keypad, events)  │  │  panel power)     │
//! └───────────────────┘  └───────────────────┘
//!            │                    │
//!            └─────────┬──────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │  panelbridge-hal (this crate - traits)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output for the power switches
//! - [`gpio::PortIo`] - Port-wide access used by the keypad matrix scan
//! - [`i2c::I2cMaster`] - Byte-phase I2C master (start/transmit/receive/stop)
//! - [`slave::SlaveHandler`] - Per-event I2C slave callback

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod slave;

// Re-export key traits at crate root for convenience
pub use gpio::{OutputPin, PinDescriptor, Port, PortIo};
pub use i2c::{Ack, I2cConfig, I2cMaster, I2cMode};
pub use slave::{BusId, SlaveEvent, SlaveHandler, SlaveReply};
