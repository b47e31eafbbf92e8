//! GPIO pin abstractions
//!
//! A single-pin output trait for the power and backlight outputs, plus a port-wide
//! trait for the keypad matrix, which drives and samples several pins that
//! share a port.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// An 8-bit GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    A,
    B,
    C,
}

impl Port {
    /// Number of ports a [`PortIo`] implementation may expose
    pub const COUNT: usize = 3;

    /// Zero-based index, usable for per-port tables
    pub const fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
            Port::C => 2,
        }
    }
}

/// Location of a single pin: a port plus a one-hot bit mask within it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinDescriptor {
    pub port: Port,
    pub mask: u8,
}

impl PinDescriptor {
    /// Descriptor for bit `bit` (0-7) of `port`
    pub const fn new(port: Port, bit: u8) -> Self {
        Self {
            port,
            mask: 1 << (bit & 0x07),
        }
    }
}

/// Port-wide digital I/O
///
/// Pins named by a [`PinDescriptor`] must already be configured with the
/// right direction; this trait only drives and samples levels.
pub trait PortIo {
    /// Sample the input levels of every pin on `port`
    fn read_port(&mut self, port: Port) -> u8;

    /// Drive the pins selected by `mask` high, leaving the others untouched
    fn set_bits(&mut self, port: Port, mask: u8);

    /// Drive the pins selected by `mask` low, leaving the others untouched
    fn clear_bits(&mut self, port: Port, mask: u8);

    /// Read a single pin
    fn is_pin_high(&mut self, pin: PinDescriptor) -> bool {
        self.read_port(pin.port) & pin.mask != 0
    }
}
