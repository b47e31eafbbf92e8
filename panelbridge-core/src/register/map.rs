//! Register storage and per-register validation

use super::layout::*;
use crate::config::{CGRAM_BLANK, DEFAULT_CONTRAST};
use crate::events::Event;
use crate::keypad::NO_KEY;

/// Application status reported at address 0x00
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    /// No work pending
    #[default]
    Normal = 0,
    /// Events raised and not yet fully drained
    Processing = 1,
}

/// Why a written byte was refused
///
/// Never leaves the slave engine; it turns into a NACK on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejected {
    /// Address at or beyond [`MAP_SIZE`]
    OutOfRange,
    /// Value outside the register's legal range
    InvalidValue,
}

/// The register block
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    pub status: Status,
    /// Last confirmed key code or [`NO_KEY`]
    pub key: u8,
    pub power: u8,
    pub contrast: u8,
    pub cursor_type: u8,
    pub cursor_row: u8,
    pub cursor_col: u8,
    pub display: [u8; DISPLAY_SIZE],
    pub cgram: [u8; CGRAM_SIZE],
    pub icons: [u8; ICON_COUNT],
}

impl RegisterMap {
    /// Power-on contents: panel on, backlight off, blank CGRAM
    pub const fn new() -> Self {
        Self {
            status: Status::Normal,
            key: NO_KEY,
            power: POWER_PANEL,
            contrast: DEFAULT_CONTRAST,
            cursor_type: 0,
            cursor_row: 0,
            cursor_col: 0,
            display: [0; DISPLAY_SIZE],
            cgram: [CGRAM_BLANK; CGRAM_SIZE],
            icons: [0; ICON_COUNT],
        }
    }

    /// Read a register as the host sees it
    ///
    /// Reading the key register hands out the key once and leaves
    /// [`NO_KEY`] behind. Returns `None` for out-of-range addresses.
    pub fn read(&mut self, address: u8) -> Option<u8> {
        if address == KEY {
            return Some(core::mem::replace(&mut self.key, NO_KEY));
        }
        self.peek(address)
    }

    /// Read a register without side effects
    pub fn peek(&self, address: u8) -> Option<u8> {
        let value = match Region::decode(address)? {
            Region::Status => self.status as u8,
            Region::Key => self.key,
            Region::Power => self.power,
            Region::Contrast => self.contrast,
            Region::CursorType => self.cursor_type,
            Region::CursorRow => self.cursor_row,
            Region::CursorCol => self.cursor_col,
            Region::Display(offset) => self.display[offset],
            Region::Cgram(offset) => self.cgram[offset],
            Region::Icon(index) => self.icons[index],
        };
        Some(value)
    }

    /// Apply a host write
    ///
    /// Returns the event the change calls for, `None` when nothing changed
    /// (or the register raises no event). On `Err` nothing was modified.
    pub fn write(&mut self, address: u8, value: u8) -> Result<Option<Event>, Rejected> {
        let region = Region::decode(address).ok_or(Rejected::OutOfRange)?;
        let event = match region {
            // Status is read-only; writes are accepted and dropped
            Region::Status => None,
            Region::Key => {
                self.key = value;
                None
            }
            Region::Power => {
                let value = limit(value, POWER_PANEL | POWER_BACKLIGHT)?;
                if value == self.power {
                    None
                } else {
                    if value & POWER_PANEL == 0 {
                        self.power_off_reset();
                    } else {
                        self.power = value;
                    }
                    Some(Event::PowerContrast)
                }
            }
            Region::Contrast => {
                update(&mut self.contrast, limit(value, 0x3F)?, Event::PowerContrast)
            }
            Region::CursorType => update(
                &mut self.cursor_type,
                limit(value, CURSOR_VISIBLE | CURSOR_BLINK)?,
                Event::CursorSet,
            ),
            Region::CursorRow => update(
                &mut self.cursor_row,
                limit(value, (DISPLAY_ROWS - 1) as u8)?,
                Event::CursorDraw,
            ),
            Region::CursorCol => update(
                &mut self.cursor_col,
                limit(value, (DISPLAY_COLUMNS - 1) as u8)?,
                Event::CursorDraw,
            ),
            Region::Display(offset) => update(
                &mut self.display[offset],
                value,
                Event::draw_line((offset / DISPLAY_COLUMNS) as u8),
            ),
            Region::Cgram(offset) => {
                update(&mut self.cgram[offset], limit(value, PIXEL_MAX)?, Event::SetCgram)
            }
            Region::Icon(index) => {
                update(&mut self.icons[index], limit(value, PIXEL_MAX)?, Event::DrawIcon)
            }
        };
        Ok(event)
    }

    /// Blank everything the panel shows, as after switching it off
    ///
    /// Key value and status are left alone.
    pub fn power_off_reset(&mut self) {
        self.power = 0;
        self.contrast = DEFAULT_CONTRAST;
        self.cursor_type = 0;
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.display = [0; DISPLAY_SIZE];
        self.cgram = [CGRAM_BLANK; CGRAM_SIZE];
        self.icons = [0; ICON_COUNT];
    }

    /// Visible part of display row `row`
    pub fn visible_line(&self, row: u8) -> [u8; VISIBLE_COLUMNS] {
        let start = usize::from(row.min(DISPLAY_ROWS as u8 - 1)) * DISPLAY_COLUMNS;
        let mut line = [0; VISIBLE_COLUMNS];
        line.copy_from_slice(&self.display[start..start + VISIBLE_COLUMNS]);
        line
    }

    /// Bitmap of CGRAM slot `slot` (0-7)
    pub fn glyph(&self, slot: usize) -> [u8; GLYPH_ROWS] {
        let start = (slot % CGRAM_SLOTS) * GLYPH_ROWS;
        let mut glyph = [0; GLYPH_ROWS];
        glyph.copy_from_slice(&self.cgram[start..start + GLYPH_ROWS]);
        glyph
    }

    /// Whether the host has defined a glyph slot
    ///
    /// A first row within the 5-bit pixel range means the slot holds glyph
    /// data; [`CGRAM_BLANK`] marks an undefined slot.
    pub fn glyph_defined(&self, slot: usize) -> bool {
        self.cgram[(slot % CGRAM_SLOTS) * GLYPH_ROWS] <= PIXEL_MAX
    }

    pub fn panel_on(&self) -> bool {
        self.power & POWER_PANEL != 0
    }

    pub fn backlight_on(&self) -> bool {
        self.power & POWER_BACKLIGHT != 0
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_type & CURSOR_VISIBLE != 0
    }

    pub fn cursor_blink(&self) -> bool {
        self.cursor_type & CURSOR_BLINK != 0
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::new()
    }
}

fn limit(value: u8, max: u8) -> Result<u8, Rejected> {
    if value > max {
        Err(Rejected::InvalidValue)
    } else {
        Ok(value)
    }
}

fn update(field: &mut u8, value: u8, event: Event) -> Option<Event> {
    if *field == value {
        None
    } else {
        *field = value;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_contents() {
        let map = RegisterMap::new();
        assert_eq!(map.status, Status::Normal);
        assert_eq!(map.key, NO_KEY);
        assert_eq!(map.power, 0x01);
        assert_eq!(map.contrast, 0x28);
        assert!(map.cgram.iter().all(|&b| b == 0xE0));
        assert!(map.display.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_status_write_is_ignored() {
        let mut map = RegisterMap::new();
        assert_eq!(map.write(STATUS, 1), Ok(None));
        assert_eq!(map.status, Status::Normal);
    }

    #[test]
    fn test_key_write_and_read_clear() {
        let mut map = RegisterMap::new();
        assert_eq!(map.write(KEY, 0x05), Ok(None));
        assert_eq!(map.read(KEY), Some(0x05));
        assert_eq!(map.read(KEY), Some(NO_KEY));
        // Peek leaves the value in place
        map.key = 3;
        assert_eq!(map.peek(KEY), Some(3));
        assert_eq!(map.peek(KEY), Some(3));
    }

    #[test]
    fn test_out_of_range_address() {
        let mut map = RegisterMap::new();
        assert_eq!(map.write(MAP_SIZE, 0), Err(Rejected::OutOfRange));
        assert_eq!(map.read(MAP_SIZE), None);
        assert_eq!(map, RegisterMap::new());
    }

    #[test]
    fn test_range_limits() {
        let mut map = RegisterMap::new();
        assert_eq!(map.write(POWER, 4), Err(Rejected::InvalidValue));
        assert_eq!(map.write(CONTRAST, 64), Err(Rejected::InvalidValue));
        assert_eq!(map.write(CURSOR_TYPE, 4), Err(Rejected::InvalidValue));
        assert_eq!(map.write(CURSOR_ROW, 2), Err(Rejected::InvalidValue));
        assert_eq!(map.write(CURSOR_COL, 40), Err(Rejected::InvalidValue));
        assert_eq!(map.write(CGRAM_BASE, 0x20), Err(Rejected::InvalidValue));
        assert_eq!(map.write(ICON_BASE + 15, 0x20), Err(Rejected::InvalidValue));
        assert_eq!(map, RegisterMap::new());

        assert_eq!(map.write(CONTRAST, 63), Ok(Some(Event::PowerContrast)));
        assert_eq!(map.write(CURSOR_COL, 39), Ok(Some(Event::CursorDraw)));
        assert_eq!(map.write(DISPLAY_BASE, 0xFF), Ok(Some(Event::DrawLine0)));
    }

    #[test]
    fn test_field_events() {
        let mut map = RegisterMap::new();
        assert_eq!(map.write(POWER, 3), Ok(Some(Event::PowerContrast)));
        assert_eq!(map.write(CURSOR_TYPE, 1), Ok(Some(Event::CursorSet)));
        assert_eq!(map.write(CURSOR_ROW, 1), Ok(Some(Event::CursorDraw)));
        assert_eq!(
            map.write(DISPLAY_BASE + 39, b'A'),
            Ok(Some(Event::DrawLine0))
        );
        assert_eq!(
            map.write(DISPLAY_BASE + 40, b'B'),
            Ok(Some(Event::DrawLine1))
        );
        assert_eq!(map.write(CGRAM_BASE + 63, 0x1F), Ok(Some(Event::SetCgram)));
        assert_eq!(map.write(ICON_BASE, 0x10), Ok(Some(Event::DrawIcon)));
    }

    #[test]
    fn test_power_off_resets_panel_state() {
        let mut map = RegisterMap::new();
        map.write(POWER, 3).unwrap();
        map.write(CONTRAST, 10).unwrap();
        map.write(CURSOR_TYPE, 3).unwrap();
        map.write(CURSOR_ROW, 1).unwrap();
        map.write(CURSOR_COL, 12).unwrap();
        map.write(DISPLAY_BASE + 3, b'x').unwrap();
        map.write(CGRAM_BASE, 0x0A).unwrap();
        map.write(ICON_BASE + 2, 0x01).unwrap();
        map.key = 7;

        // Backlight bit alone still means panel off
        assert_eq!(map.write(POWER, 2), Ok(Some(Event::PowerContrast)));

        let mut expected = RegisterMap::new();
        expected.power = 0;
        expected.key = 7;
        assert_eq!(map, expected);
    }

    #[test]
    fn test_power_unchanged_raises_nothing() {
        let mut map = RegisterMap::new();
        assert_eq!(map.write(POWER, 1), Ok(None));
        map.write(POWER, 0).unwrap();
        assert_eq!(map.write(POWER, 0), Ok(None));
    }

    #[test]
    fn test_line_and_glyph_views() {
        let mut map = RegisterMap::new();
        for (i, b) in b"HELLO".iter().enumerate() {
            map.write(DISPLAY_BASE + 40 + i as u8, *b).unwrap();
        }
        let line = map.visible_line(1);
        assert_eq!(&line[..5], b"HELLO");
        assert_eq!(&line[5..], &[0; 11]);

        assert!(!map.glyph_defined(2));
        map.write(CGRAM_BASE + 16, 0x04).unwrap();
        assert!(map.glyph_defined(2));
        assert_eq!(map.glyph(2)[0], 0x04);
        assert_eq!(map.glyph(2)[1], 0xE0);
    }

    fn writable_pair() -> impl Strategy<Value = (u8, u8)> {
        prop_oneof![
            prop_oneof![Just(0u8), Just(1u8), Just(3u8)].prop_map(|v| (POWER, v)),
            (0u8..=63).prop_map(|v| (CONTRAST, v)),
            (0u8..=3).prop_map(|v| (CURSOR_TYPE, v)),
            (0u8..=1).prop_map(|v| (CURSOR_ROW, v)),
            (0u8..=39).prop_map(|v| (CURSOR_COL, v)),
            (DISPLAY_BASE..CGRAM_BASE, any::<u8>()),
            (CGRAM_BASE..MAP_SIZE, 0u8..=0x1F),
        ]
    }

    proptest! {
        #[test]
        fn prop_valid_write_reads_back((address, value) in writable_pair()) {
            let mut map = RegisterMap::new();
            prop_assert!(map.write(address, value).is_ok());
            prop_assert_eq!(map.read(address), Some(value));
        }

        #[test]
        fn prop_rewrite_raises_no_event((address, value) in writable_pair()) {
            let mut map = RegisterMap::new();
            map.write(address, value).unwrap();
            let snapshot = map.clone();
            prop_assert_eq!(map.write(address, value), Ok(None));
            prop_assert_eq!(map, snapshot);
        }

        #[test]
        fn prop_rejected_write_changes_nothing(address in 0u8..=255, value in any::<u8>()) {
            let mut map = RegisterMap::new();
            map.write(DISPLAY_BASE, b'Z').unwrap();
            let snapshot = map.clone();
            if map.write(address, value).is_err() {
                prop_assert_eq!(map, snapshot);
            }
        }
    }
}
