//! GPIO panel power
//!
//! LCD supply and backlight switched by two GPIO pins, directly or via a
//! load switch or transistor.

use panelbridge_core::traits::PanelPower;
use panelbridge_hal::OutputPin;

/// Panel supply and backlight on GPIO pins
///
/// Each pin can be active-high (default) or active-low.
pub struct GpioPanelPower<P, B> {
    panel: P,
    backlight: B,
    /// If true, panel ON = pin LOW
    panel_inverted: bool,
    /// If true, backlight ON = pin LOW
    backlight_inverted: bool,
    panel_on: bool,
    backlight_on: bool,
}

impl<P: OutputPin, B: OutputPin> GpioPanelPower<P, B> {
    /// Create a new panel power output
    ///
    /// Both switches start off.
    pub fn new(panel: P, panel_inverted: bool, backlight: B, backlight_inverted: bool) -> Self {
        let mut power = Self {
            panel,
            backlight,
            panel_inverted,
            backlight_inverted,
            panel_on: false,
            backlight_on: false,
        };
        power.set_panel(false);
        power.set_backlight(false);
        power
    }

    pub fn new_active_high(panel: P, backlight: B) -> Self {
        Self::new(panel, false, backlight, false)
    }

    pub fn new_active_low(panel: P, backlight: B) -> Self {
        Self::new(panel, true, backlight, true)
    }
}

impl<P: OutputPin, B: OutputPin> PanelPower for GpioPanelPower<P, B> {
    fn set_panel(&mut self, on: bool) {
        self.panel_on = on;
        self.panel.set_state(on != self.panel_inverted);
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight_on = on;
        self.backlight.set_state(on != self.backlight_inverted);
    }

    fn is_panel_on(&self) -> bool {
        self.panel_on
    }

    fn is_backlight_on(&self) -> bool {
        self.backlight_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl MockPin {
        fn new() -> Self {
            Self { high: true }
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high_starts_off() {
        let power = GpioPanelPower::new_active_high(MockPin::new(), MockPin::new());

        assert!(!power.is_panel_on());
        assert!(!power.is_backlight_on());
        assert!(power.panel.is_set_low());
        assert!(power.backlight.is_set_low());
    }

    #[test]
    fn test_switches_are_independent() {
        let mut power = GpioPanelPower::new_active_high(MockPin::new(), MockPin::new());

        power.set_panel(true);
        assert!(power.is_panel_on());
        assert!(power.panel.is_set_high());
        assert!(!power.is_backlight_on());
        assert!(power.backlight.is_set_low());

        power.set_backlight(true);
        power.set_panel(false);
        assert!(power.backlight.is_set_high());
        assert!(power.panel.is_set_low());
    }

    #[test]
    fn test_active_low_backlight() {
        let mut power = GpioPanelPower::new(MockPin::new(), false, MockPin::new(), true);

        // Off means high for the active-low backlight
        assert!(power.backlight.is_set_high());

        power.set_backlight(true);
        assert!(power.is_backlight_on());
        assert!(power.backlight.is_set_low());
        assert!(power.panel.is_set_low());
    }
}
