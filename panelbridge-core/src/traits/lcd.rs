//! Character LCD controller trait

/// Operations of a 2-line character LCD with CGRAM and icon RAM
///
/// Cursor positions are linear: `row * 40 + col`, 0..=79. Implementations
/// keep a shadow of the controller's cursor and settings so redundant
/// commands can be skipped.
pub trait LcdController {
    /// Bus error type
    type Error;

    /// Full controller initialization; clears the display
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Set contrast (0-63); a value equal to the current one sends nothing
    fn set_contrast(&mut self, contrast: u8) -> Result<(), Self::Error>;

    /// Clear display RAM and home the cursor
    fn clear_display(&mut self) -> Result<(), Self::Error>;

    /// Turn off every icon segment
    fn clear_icons(&mut self) -> Result<(), Self::Error>;

    /// Enable or disable the icon display
    fn set_icon_display(&mut self, on: bool) -> Result<(), Self::Error>;

    /// Display on/off, cursor underline and cursor blink
    fn set_display_settings(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink: bool,
    ) -> Result<(), Self::Error>;

    /// Move the cursor
    ///
    /// Returns `Ok(false)` for a position outside row 0..=1, col 0..=39.
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<bool, Self::Error>;

    /// Move the cursor one position left; `Ok(false)` at position 0
    fn cursor_left(&mut self) -> Result<bool, Self::Error>;

    /// Move the cursor one position right; `Ok(false)` at position 79
    fn cursor_right(&mut self) -> Result<bool, Self::Error>;

    /// Write character codes at the cursor, which advances past them
    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Define glyph `slot` (0-7); rows are masked to 5 bits
    fn write_cgram(&mut self, slot: u8, glyph: &[u8; 8]) -> Result<(), Self::Error>;

    /// Set icon segment byte `address` (0-15); bits are masked to 5 bits
    fn write_icon(&mut self, address: u8, bits: u8) -> Result<(), Self::Error>;

    fn cursor_row(&self) -> u8;

    fn cursor_col(&self) -> u8;
}
