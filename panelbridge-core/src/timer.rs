//! Periodic tick handler
//!
//! Runs once per timer interrupt: advances the application timer, raises
//! TIMER every `divider` ticks, and scans the keypad. Each tick performs a
//! buffered capture followed by an instantaneous read, so the debouncer
//! sees two scans per tick; a code confirmed by the second scan is
//! published in the key register.

use panelbridge_hal::PortIo;

use crate::config::BridgeConfig;
use crate::events::Event;
use crate::keypad::Keypad;
use crate::state::AppState;

/// Tick counter and TIMER divider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickHandler {
    count: u16,
    /// Counter runs 0..=period then wraps to 0
    period: u16,
    divider: u16,
}

impl TickHandler {
    /// # Arguments
    /// - `period`: highest counter value before wrapping, normally the tick rate
    /// - `divider`: raise TIMER when the counter is a multiple of this
    pub const fn new(period: u16, divider: u16) -> Self {
        Self {
            count: 0,
            period,
            divider: if divider == 0 { 1 } else { divider },
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        let period = u16::try_from(config.tick_hz).unwrap_or(u16::MAX);
        Self::new(period, config.timer_divider)
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    /// Handle one tick; must run with interrupts masked
    ///
    /// Returns the key code published this tick, if any.
    pub fn on_tick<P: PortIo>(&mut self, state: &mut AppState, keypad: &mut Keypad<P>) -> Option<u8> {
        if self.count < self.period {
            self.count += 1;
        } else {
            self.count = 0;
        }
        if self.count % self.divider == 0 {
            state.raise(Event::Timer);
        }

        keypad.update_buffer();
        let key = keypad.read();
        if let Some(code) = key {
            state.set_key(code);
        }
        key
    }
}

impl Default for TickHandler {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}
