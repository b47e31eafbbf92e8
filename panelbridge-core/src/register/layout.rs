//! Register addresses and geometry

/// Total size of the register block; any address at or above is invalid
pub const MAP_SIZE: u8 = 0xA7;

pub const STATUS: u8 = 0x00;
pub const KEY: u8 = 0x01;
pub const POWER: u8 = 0x02;
pub const CONTRAST: u8 = 0x03;
pub const CURSOR_TYPE: u8 = 0x04;
pub const CURSOR_ROW: u8 = 0x05;
pub const CURSOR_COL: u8 = 0x06;
pub const DISPLAY_BASE: u8 = 0x07;
pub const CGRAM_BASE: u8 = 0x57;
pub const ICON_BASE: u8 = 0x97;

/// Display RAM columns per row (controller layout, not panel width)
pub const DISPLAY_COLUMNS: usize = 40;
pub const DISPLAY_ROWS: usize = 2;
pub const DISPLAY_SIZE: usize = DISPLAY_COLUMNS * DISPLAY_ROWS;
/// Columns actually visible on the 16x2 panel
pub const VISIBLE_COLUMNS: usize = 16;

pub const CGRAM_SLOTS: usize = 8;
pub const GLYPH_ROWS: usize = 8;
pub const CGRAM_SIZE: usize = CGRAM_SLOTS * GLYPH_ROWS;
pub const ICON_COUNT: usize = 16;

/// Power register bits
pub const POWER_PANEL: u8 = 0x01;
pub const POWER_BACKLIGHT: u8 = 0x02;

/// Cursor type register bits
pub const CURSOR_VISIBLE: u8 = 0x01;
pub const CURSOR_BLINK: u8 = 0x02;

/// Largest value a 5-bit CGRAM row or icon byte may hold
pub const PIXEL_MAX: u8 = 0x1F;

/// Which register an address falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    Status,
    Key,
    Power,
    Contrast,
    CursorType,
    CursorRow,
    CursorCol,
    /// Offset into display RAM (0..80)
    Display(usize),
    /// Offset into CGRAM (0..64)
    Cgram(usize),
    /// Icon index (0..16)
    Icon(usize),
}

impl Region {
    /// Decode an address, `None` when out of range
    pub const fn decode(address: u8) -> Option<Self> {
        let region = match address {
            STATUS => Region::Status,
            KEY => Region::Key,
            POWER => Region::Power,
            CONTRAST => Region::Contrast,
            CURSOR_TYPE => Region::CursorType,
            CURSOR_ROW => Region::CursorRow,
            CURSOR_COL => Region::CursorCol,
            a if a < CGRAM_BASE => Region::Display((a - DISPLAY_BASE) as usize),
            a if a < ICON_BASE => Region::Cgram((a - CGRAM_BASE) as usize),
            a if a < MAP_SIZE => Region::Icon((a - ICON_BASE) as usize),
            _ => return None,
        };
        Some(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_contiguous() {
        assert_eq!(DISPLAY_BASE as usize + DISPLAY_SIZE, CGRAM_BASE as usize);
        assert_eq!(CGRAM_BASE as usize + CGRAM_SIZE, ICON_BASE as usize);
        assert_eq!(ICON_BASE as usize + ICON_COUNT, MAP_SIZE as usize);
    }

    #[test]
    fn test_decode_boundaries() {
        assert_eq!(Region::decode(0x00), Some(Region::Status));
        assert_eq!(Region::decode(0x06), Some(Region::CursorCol));
        assert_eq!(Region::decode(0x07), Some(Region::Display(0)));
        assert_eq!(Region::decode(0x56), Some(Region::Display(79)));
        assert_eq!(Region::decode(0x57), Some(Region::Cgram(0)));
        assert_eq!(Region::decode(0x96), Some(Region::Cgram(63)));
        assert_eq!(Region::decode(0x97), Some(Region::Icon(0)));
        assert_eq!(Region::decode(0xA6), Some(Region::Icon(15)));
        assert_eq!(Region::decode(0xA7), None);
        assert_eq!(Region::decode(0xFF), None);
    }
}
