//! Hardware drivers for the panelbridge firmware
//!
//! - [`lcd::St7032`]: ST7032 character LCD over a byte-phase I2C master
//! - [`power::GpioPanelPower`]: panel supply and backlight on GPIO pins
//! - [`bus::BlockingMaster`]: byte-phase master on top of an
//!   `embedded-hal` blocking I2C bus

#![no_std]

pub mod bus;
pub mod lcd;
pub mod power;
