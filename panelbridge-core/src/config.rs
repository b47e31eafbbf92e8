//! Bridge configuration
//!
//! Defaults match the reference hardware: slave address 0x08, a 128 Hz
//! keypad scan and a 64 Hz application timer. The firmware build script
//! validates `bridge.toml` and feeds the resulting values into
//! [`BridgeConfig`].

use panelbridge_hal::I2cConfig;

/// Default 7-bit slave address on the host bus
pub const DEFAULT_SLAVE_ADDRESS: u8 = 0x08;

/// Mid-scale contrast, used at power-on and after a panel power-off
pub const DEFAULT_CONTRAST: u8 = 0x28;

/// CGRAM fill meaning "glyph not yet written"
///
/// Any first glyph byte >= 0x20 is outside the 5-bit pixel range and marks
/// the slot as unsent.
pub const CGRAM_BLANK: u8 = 0xE0;

/// Scan rate the debounce thresholds are tuned for
pub const REFERENCE_TICK_HZ: u32 = 128;

/// Ticks per application TIMER event
pub const DEFAULT_TIMER_DIVIDER: u16 = 2;

/// Keypad scans per tick: a buffered capture, then the read that publishes
pub const SCANS_PER_TICK: u16 = 2;

/// Keypad run-length thresholds, counted in consecutive scans
///
/// Every threshold is a whole number of ticks, so reports always fall on
/// the second scan of a tick, whose result goes to the key register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceThresholds {
    /// First report of a press
    pub press: u16,
    /// Second report once the key is held
    pub hold: u16,
    /// Start of auto-repeat
    pub repeat_start: u16,
    /// Each time the run reaches this count it is wound back to
    /// `repeat_start`, so repeats come every `repeat_end - repeat_start` scans
    pub repeat_end: u16,
}

impl DebounceThresholds {
    /// Thresholds at [`REFERENCE_TICK_HZ`]
    pub const REFERENCE: Self = Self {
        press: 6,
        hold: 128,
        repeat_start: 256,
        repeat_end: 268,
    };

    /// Rescale the reference thresholds to another tick rate
    ///
    /// Keeps the wall-clock timing to the nearest tick; each threshold is at
    /// least one tick above the previous one.
    pub const fn for_scan_rate(tick_hz: u32) -> Self {
        let r = Self::REFERENCE;
        let press = scale(r.press, tick_hz, SCANS_PER_TICK);
        let hold = scale(r.hold, tick_hz, press + SCANS_PER_TICK);
        let repeat_start = scale(r.repeat_start, tick_hz, hold + SCANS_PER_TICK);
        let repeat_end = scale(r.repeat_end, tick_hz, repeat_start + SCANS_PER_TICK);
        Self {
            press,
            hold,
            repeat_start,
            repeat_end,
        }
    }

    /// Check that thresholds are ordered whole ticks
    pub const fn is_valid(&self) -> bool {
        self.press > 0
            && self.press < self.hold
            && self.hold < self.repeat_start
            && self.repeat_start < self.repeat_end
            && self.press % SCANS_PER_TICK == 0
            && self.hold % SCANS_PER_TICK == 0
            && self.repeat_start % SCANS_PER_TICK == 0
            && self.repeat_end % SCANS_PER_TICK == 0
    }
}

impl Default for DebounceThresholds {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// `count` scans at the reference rate, rescaled to `tick_hz` and rounded to
/// whole ticks, clamped to `[min, u16::MAX - 1]`
const fn scale(count: u16, tick_hz: u32, min: u16) -> u16 {
    let per_tick = SCANS_PER_TICK as u32;
    let ticks = (count as u32 / per_tick * tick_hz + REFERENCE_TICK_HZ / 2) / REFERENCE_TICK_HZ;
    let scans = ticks * per_tick;
    if scans < min as u32 {
        min
    } else if scans > (u16::MAX - 1) as u32 {
        u16::MAX - 1
    } else {
        scans as u16
    }
}

/// Configuration problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Slave address is outside 0x08..=0x77 (reserved I2C ranges)
    ReservedAddress,
    /// Tick rate is zero or too high to scan
    TickRate,
    /// Timer divider is zero or longer than a tick period
    TimerDivider,
    /// Debounce thresholds are not increasing whole ticks
    Debounce,
}

/// Complete bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// 7-bit address on the host (slave) bus
    pub slave_address: u8,
    /// Keypad scan / tick rate in Hz
    pub tick_hz: u32,
    /// Ticks per TIMER event
    pub timer_divider: u16,
    /// Keypad thresholds, already scaled to `tick_hz`
    pub debounce: DebounceThresholds,
    /// LCD (master) bus settings
    pub master: I2cConfig,
}

impl BridgeConfig {
    /// Highest supported tick rate
    pub const MAX_TICK_HZ: u32 = 1024;

    /// Defaults for a given tick rate, with thresholds rescaled to it
    pub const fn with_tick_rate(tick_hz: u32) -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,
            tick_hz,
            timer_divider: DEFAULT_TIMER_DIVIDER,
            debounce: DebounceThresholds::for_scan_rate(tick_hz),
            master: I2cConfig::STANDARD_8MHZ,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0x08..=0x77).contains(&self.slave_address) {
            return Err(ConfigError::ReservedAddress);
        }
        if self.tick_hz == 0 || self.tick_hz > Self::MAX_TICK_HZ {
            return Err(ConfigError::TickRate);
        }
        if self.timer_divider == 0 || u32::from(self.timer_divider) > self.tick_hz {
            return Err(ConfigError::TimerDivider);
        }
        if !self.debounce.is_valid() {
            return Err(ConfigError::Debounce);
        }
        Ok(())
    }

    /// `self` if it passes [`BridgeConfig::validate`]
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate().map(|()| self)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::with_tick_rate(REFERENCE_TICK_HZ)
    }
}
