//! I2C master abstractions
//!
//! The LCD controller is driven one bus phase at a time: a start condition
//! with the address byte, a run of transmitted bytes, then a stop. The
//! [`I2cMaster`] trait exposes exactly those phases so a driver can
//! interleave control bytes and data without building whole frames.

/// Acknowledge state returned by the addressed device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    /// The byte was acknowledged (SDA pulled low)
    Ack,
    /// The byte was not acknowledged
    Nack,
}

impl Ack {
    pub const fn is_ack(self) -> bool {
        matches!(self, Ack::Ack)
    }

    pub const fn from_bool(acked: bool) -> Self {
        if acked {
            Ack::Ack
        } else {
            Ack::Nack
        }
    }
}

/// Byte-phase I2C bus master
///
/// Calls must follow bus order: `start`, any number of `transmit` or
/// `receive`, then `stop`. A second `start` before `stop` is a repeated
/// start.
pub trait I2cMaster {
    /// Error type for bus faults (arbitration loss, timeouts, ...)
    type Error;

    /// Issue a start condition and send the address byte
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `read` - true for a read transfer, false for a write
    fn start(&mut self, address: u8, read: bool) -> Result<Ack, Self::Error>;

    /// Issue a stop condition
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Send one byte and report the device's acknowledge
    fn transmit(&mut self, byte: u8) -> Result<Ack, Self::Error>;

    /// Receive one byte
    ///
    /// # Arguments
    /// * `nack` - answer with NACK to tell the device this is the last byte
    fn receive(&mut self, nack: bool) -> Result<u8, Self::Error>;

    /// Write `data` to `address` as one complete transfer
    fn write(&mut self, address: u8, data: &[u8]) -> Result<Ack, Self::Error> {
        let mut ack = self.start(address, false)?;
        for &byte in data {
            if !ack.is_ack() {
                break;
            }
            ack = self.transmit(byte)?;
        }
        self.stop()?;
        Ok(ack)
    }
}

/// Bus speed class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cMode {
    /// 100 kHz
    Standard,
    /// 400 kHz
    High,
}

impl I2cMode {
    /// Nominal bus frequency in Hz
    pub const fn frequency(self) -> u32 {
        match self {
            I2cMode::Standard => 100_000,
            I2cMode::High => 400_000,
        }
    }
}

/// I2C master configuration
///
/// Baud-rate generators clocked from the core oscillator take a divisor
/// `fosc / (4 * f) - 1`; chips with their own clock tree may use
/// [`I2cConfig::frequency_hz`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    pub mode: I2cMode,
    /// Baud-rate generator reload value
    pub clock_divisor: u8,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD_8MHZ
    }
}

impl I2cConfig {
    /// 100 kHz from an 8 MHz oscillator
    pub const STANDARD_8MHZ: Self = Self {
        mode: I2cMode::Standard,
        clock_divisor: 0x13,
    };

    /// 400 kHz from an 8 MHz oscillator
    pub const HIGH_8MHZ: Self = Self {
        mode: I2cMode::High,
        clock_divisor: 0x04,
    };

    /// 8 MHz preset for `mode`
    pub const fn for_mode(mode: I2cMode) -> Self {
        match mode {
            I2cMode::Standard => Self::STANDARD_8MHZ,
            I2cMode::High => Self::HIGH_8MHZ,
        }
    }

    /// Compute the divisor for `mode` from the oscillator frequency
    ///
    /// Returns `None` when the result does not fit the 8-bit generator.
    pub const fn for_oscillator(mode: I2cMode, fosc_hz: u32) -> Option<Self> {
        let ratio = fosc_hz / (4 * mode.frequency());
        if ratio == 0 || ratio > 256 {
            return None;
        }
        Some(Self {
            mode,
            clock_divisor: (ratio - 1) as u8,
        })
    }

    /// Actual bus frequency produced by this divisor
    pub const fn frequency_hz(&self, fosc_hz: u32) -> u32 {
        fosc_hz / (4 * (self.clock_divisor as u32 + 1))
    }
}
