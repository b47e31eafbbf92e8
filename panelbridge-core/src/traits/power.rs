//! Panel supply and backlight control

/// Panel power and backlight switches
///
/// Implementations control the LCD supply and backlight via GPIO, load
/// switches or transistors.
pub trait PanelPower {
    /// Switch the LCD supply
    fn set_panel(&mut self, on: bool);

    /// Switch the backlight
    fn set_backlight(&mut self, on: bool);

    /// Check if the LCD supply is on
    fn is_panel_on(&self) -> bool;

    /// Check if the backlight is on
    fn is_backlight_on(&self) -> bool;
}
