//! Run-length debounce with auto-repeat

use crate::config::DebounceThresholds;

/// Counts consecutive identical scans
///
/// A code is reported when its run reaches `press`, again at `hold` and at
/// `repeat_start`, then every `repeat_end - repeat_start` scans while held.
/// A different code restarts the run at 1; an empty scan resets it to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    thresholds: DebounceThresholds,
    last: Option<u8>,
    run: u16,
}

impl Debouncer {
    pub const fn new(thresholds: DebounceThresholds) -> Self {
        Self {
            thresholds,
            last: None,
            run: 0,
        }
    }

    /// Feed one raw scan result
    pub fn update(&mut self, raw: Option<u8>) -> Option<u8> {
        let Some(code) = raw else {
            self.last = None;
            self.run = 0;
            return None;
        };

        if self.last != Some(code) {
            self.last = Some(code);
            self.run = 1;
            return None;
        }

        self.run += 1;
        let t = &self.thresholds;
        if self.run == t.repeat_end {
            self.run = t.repeat_start;
            return Some(code);
        }
        if self.run == t.press || self.run == t.hold || self.run == t.repeat_start {
            return Some(code);
        }
        None
    }

    /// Length of the current run
    pub fn run(&self) -> u16 {
        self.run
    }
}
