//! Board configuration
//!
//! Values come from bridge.toml, validated and turned into constants by
//! the build script.

use panelbridge_core::config::{BridgeConfig, ConfigError};
use panelbridge_hal::{I2cConfig, PinDescriptor, Port};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/bridge_config.rs"));
}

pub use generated::*;

/// Core configuration for this board
pub fn bridge_config() -> Result<BridgeConfig, ConfigError> {
    let mut config = BridgeConfig::with_tick_rate(TICK_HZ);
    config.slave_address = SLAVE_ADDRESS;
    config.timer_divider = TIMER_DIVIDER;
    config.master = I2cConfig::for_mode(LCD_MODE);
    config.validated()
}

/// Port/bit position of a bank-0 GPIO: 8 GPIOs per port
pub const fn pin_descriptor(gpio: u8) -> PinDescriptor {
    let port = match gpio / 8 {
        0 => Port::A,
        1 => Port::B,
        _ => Port::C,
    };
    PinDescriptor::new(port, gpio % 8)
}
