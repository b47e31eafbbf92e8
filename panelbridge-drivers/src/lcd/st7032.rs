//! ST7032 LCD Driver
//!
//! Driver for ST7032-based 16x2 character LCDs with icon RAM (e.g. the
//! common 3.3 V "AQM1602" style modules) over I2C.
//!
//! Every transfer starts with a control byte: `0x80` for a command followed
//! by another control byte, `0x00` for the last command of a transfer and
//! `0x40` for a run of data bytes. The driver keeps a shadow of the cursor
//! position and of the icon/booster/contrast settings, since the
//! controller cannot be read back over I2C.

use embedded_hal::delay::DelayNs;
use panelbridge_core::traits::LcdController;
use panelbridge_hal::I2cMaster;

/// ST7032 I2C address
pub const ST7032_ADDR: u8 = 0x3E;

/// Control bytes
mod control {
    pub const COMMAND_LAST: u8 = 0x00;
    pub const COMMAND_MORE: u8 = 0x80;
    pub const DATA: u8 = 0x40;
}

/// ST7032 commands
#[allow(dead_code)]
mod cmd {
    pub const CLEAR_DISPLAY: u8 = 0x01;
    pub const ENTRY_MODE: u8 = 0x04;
    pub const ENTRY_INCREMENT: u8 = 0x02;
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x04;
    pub const CURSOR_ON: u8 = 0x02;
    pub const BLINK_ON: u8 = 0x01;
    /// 8-bit bus, 2 lines, instruction table 0
    pub const FUNCTION_SET: u8 = 0x38;
    /// 8-bit bus, 2 lines, instruction table 1
    pub const FUNCTION_SET_EXT: u8 = 0x39;
    pub const SET_CGRAM: u8 = 0x40;
    pub const SET_DDRAM: u8 = 0x80;

    // Instruction table 1
    /// Bias 1/5, oscillator ~183 Hz
    pub const OSC_FREQ: u8 = 0x14;
    pub const SET_ICON_ADDR: u8 = 0x40;
    /// Low nibble: icon, booster, contrast bits 5-4
    pub const POWER_ICON_CONTRAST: u8 = 0x50;
    /// Follower on, amplifier ratio 0b100
    pub const FOLLOWER: u8 = 0x6C;
    /// Low nibble: contrast bits 3-0
    pub const CONTRAST_LOW: u8 = 0x70;
}

/// Execution time of an ordinary instruction
const COMMAND_WAIT_US: u32 = 26;

/// Execution time of clear display
const CLEAR_WAIT_US: u32 = 1080;

/// Linear cursor positions (2 rows of 40)
const POSITIONS: u8 = 80;
const ROW_WIDTH: u8 = 40;

/// Icon on, booster on, contrast 0x28
const DEFAULT_SETTINGS: u8 = 0xE8;
const SETTINGS_ICON: u8 = 0x80;
const SETTINGS_CONTRAST: u8 = 0x3F;

/// Errors from the ST7032 driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum St7032Error<E> {
    /// The bus reported a fault
    Bus(E),
    /// Nothing acknowledged the controller address
    NoAcknowledge,
}

/// ST7032 LCD driver
pub struct St7032<M, D> {
    bus: M,
    delay: D,
    address: u8,
    /// Linear cursor position, 0..80
    position: u8,
    /// bit7 icon, bit6 booster, bits 5-0 contrast
    settings: u8,
}

type Result<T, E> = core::result::Result<T, St7032Error<E>>;

impl<M, D> St7032<M, D>
where
    M: I2cMaster,
    D: DelayNs,
{
    /// Create a new driver at the default address
    ///
    /// Call [`LcdController::init`] before anything else.
    pub fn new(bus: M, delay: D) -> Self {
        Self::with_address(bus, delay, ST7032_ADDR)
    }

    pub fn with_address(bus: M, delay: D, address: u8) -> Self {
        Self {
            bus,
            delay,
            address,
            position: 0,
            settings: DEFAULT_SETTINGS,
        }
    }

    /// Linear cursor position
    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn contrast(&self) -> u8 {
        self.settings & SETTINGS_CONTRAST
    }

    pub fn icons_enabled(&self) -> bool {
        self.settings & SETTINGS_ICON != 0
    }

    /// Write an ASCII string at the cursor
    pub fn write_str(&mut self, text: &str) -> Result<(), M::Error> {
        self.write_bytes(text.as_bytes())
    }

    /// Give back the bus and delay
    pub fn release(self) -> (M, D) {
        (self.bus, self.delay)
    }

    fn begin(&mut self) -> Result<(), M::Error> {
        let ack = self
            .bus
            .start(self.address, false)
            .map_err(St7032Error::Bus)?;
        if !ack.is_ack() {
            self.bus.stop().map_err(St7032Error::Bus)?;
            return Err(St7032Error::NoAcknowledge);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), M::Error> {
        self.bus.stop().map_err(St7032Error::Bus)
    }

    fn send(&mut self, byte: u8) -> Result<(), M::Error> {
        self.bus.transmit(byte).map_err(St7032Error::Bus)?;
        Ok(())
    }

    /// Command with more to follow in the same transfer
    fn command(&mut self, command: u8) -> Result<(), M::Error> {
        self.send(control::COMMAND_MORE)?;
        self.send(command)?;
        self.delay.delay_us(COMMAND_WAIT_US);
        Ok(())
    }

    /// Final command of a transfer
    fn last_command(&mut self, command: u8, wait_us: u32) -> Result<(), M::Error> {
        self.send(control::COMMAND_LAST)?;
        self.send(command)?;
        self.end()?;
        self.delay.delay_us(wait_us);
        Ok(())
    }

    /// Contrast and icon/booster commands; instruction table 1 must be active
    fn settings_commands(&mut self) -> Result<(), M::Error> {
        self.command(cmd::CONTRAST_LOW | (self.settings & 0x0F))?;
        self.command(cmd::POWER_ICON_CONTRAST | (self.settings >> 4))
    }

    /// Set the DDRAM address for a linear position
    fn move_to(&mut self, position: u8) -> Result<(), M::Error> {
        self.position = position;
        let ddram = (position / ROW_WIDTH) * 0x40 + position % ROW_WIDTH;
        self.begin()?;
        self.last_command(cmd::SET_DDRAM | (ddram & 0x7F), COMMAND_WAIT_US)
    }
}

impl<M, D> LcdController for St7032<M, D>
where
    M: I2cMaster,
    D: DelayNs,
{
    type Error = St7032Error<M::Error>;

    fn init(&mut self) -> Result<(), M::Error> {
        self.position = 0;
        self.settings = DEFAULT_SETTINGS;

        self.begin()?;
        self.command(cmd::FUNCTION_SET_EXT)?;
        self.command(cmd::OSC_FREQ)?;
        self.settings_commands()?;
        self.command(cmd::FOLLOWER)?;
        self.command(cmd::FUNCTION_SET)?;
        self.command(cmd::DISPLAY_CONTROL | cmd::DISPLAY_ON)?;
        self.command(cmd::ENTRY_MODE | cmd::ENTRY_INCREMENT)?;
        self.command(cmd::SET_DDRAM)?;
        self.last_command(cmd::CLEAR_DISPLAY, CLEAR_WAIT_US)
    }

    fn set_contrast(&mut self, contrast: u8) -> Result<(), M::Error> {
        let contrast = contrast & SETTINGS_CONTRAST;
        if self.contrast() == contrast {
            return Ok(());
        }
        self.settings = (self.settings & !SETTINGS_CONTRAST) | contrast;

        self.begin()?;
        self.command(cmd::FUNCTION_SET_EXT)?;
        self.settings_commands()?;
        self.last_command(cmd::FUNCTION_SET, COMMAND_WAIT_US)
    }

    fn clear_display(&mut self) -> Result<(), M::Error> {
        self.begin()?;
        self.last_command(cmd::CLEAR_DISPLAY, CLEAR_WAIT_US)?;
        self.position = 0;
        Ok(())
    }

    fn clear_icons(&mut self) -> Result<(), M::Error> {
        self.begin()?;
        self.command(cmd::FUNCTION_SET_EXT)?;
        self.command(cmd::SET_ICON_ADDR)?;
        self.last_command(cmd::FUNCTION_SET, COMMAND_WAIT_US)?;

        self.begin()?;
        self.send(control::DATA)?;
        for _ in 0..16 {
            self.send(0)?;
            self.delay.delay_us(COMMAND_WAIT_US);
        }
        self.end()?;

        // Icon writes moved the address counter
        self.move_to(self.position)
    }

    fn set_icon_display(&mut self, on: bool) -> Result<(), M::Error> {
        if self.icons_enabled() == on {
            return Ok(());
        }
        self.settings = (self.settings & !SETTINGS_ICON) | if on { SETTINGS_ICON } else { 0 };

        self.begin()?;
        self.command(cmd::FUNCTION_SET_EXT)?;
        self.command(cmd::POWER_ICON_CONTRAST | (self.settings >> 4))?;
        self.last_command(cmd::FUNCTION_SET, COMMAND_WAIT_US)
    }

    fn set_display_settings(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink: bool,
    ) -> Result<(), M::Error> {
        let mut command = cmd::DISPLAY_CONTROL;
        if display_on {
            command |= cmd::DISPLAY_ON;
        }
        if cursor_on {
            command |= cmd::CURSOR_ON;
        }
        if blink {
            command |= cmd::BLINK_ON;
        }
        self.begin()?;
        self.last_command(command, COMMAND_WAIT_US)
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<bool, M::Error> {
        if row > 1 || col >= ROW_WIDTH {
            return Ok(false);
        }
        let position = row * ROW_WIDTH + col;
        if position != self.position {
            self.move_to(position)?;
        }
        Ok(true)
    }

    fn cursor_left(&mut self) -> Result<bool, M::Error> {
        if self.position == 0 {
            return Ok(false);
        }
        self.move_to(self.position - 1)?;
        Ok(true)
    }

    fn cursor_right(&mut self) -> Result<bool, M::Error> {
        if self.position >= POSITIONS - 1 {
            return Ok(false);
        }
        self.move_to(self.position + 1)?;
        Ok(true)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), M::Error> {
        self.begin()?;
        self.send(control::DATA)?;
        for &byte in data {
            self.send(byte)?;
            self.delay.delay_us(COMMAND_WAIT_US);
        }
        self.end()?;

        let advanced = (usize::from(self.position) + data.len()) % usize::from(POSITIONS);
        self.position = advanced as u8;
        Ok(())
    }

    fn write_cgram(&mut self, slot: u8, glyph: &[u8; 8]) -> Result<(), M::Error> {
        self.begin()?;
        self.command(cmd::FUNCTION_SET)?;
        self.command(cmd::SET_CGRAM | ((slot << 3) & 0x38))?;
        self.send(control::DATA)?;
        for &row in glyph {
            self.send(row & 0x1F)?;
            self.delay.delay_us(COMMAND_WAIT_US);
        }
        self.end()?;

        self.move_to(self.position)
    }

    fn write_icon(&mut self, address: u8, bits: u8) -> Result<(), M::Error> {
        self.begin()?;
        self.command(cmd::FUNCTION_SET_EXT)?;
        self.command(cmd::SET_ICON_ADDR | (address & 0x0F))?;
        self.command(cmd::FUNCTION_SET)?;
        self.send(control::DATA)?;
        self.send(bits & 0x1F)?;
        self.end()?;
        self.delay.delay_us(COMMAND_WAIT_US);

        self.move_to(self.position)
    }

    fn cursor_row(&self) -> u8 {
        self.position / ROW_WIDTH
    }

    fn cursor_col(&self) -> u8 {
        self.position % ROW_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use panelbridge_hal::Ack;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Bus {
        Start(u8),
        Byte(u8),
        Stop,
    }
    use Bus::{Byte, Start, Stop};

    #[derive(Default)]
    struct MockBus {
        log: Vec<Bus, 256>,
        absent: bool,
    }

    impl I2cMaster for MockBus {
        type Error = ();

        fn start(&mut self, address: u8, _read: bool) -> core::result::Result<Ack, ()> {
            self.log.push(Start(address)).map_err(|_| ())?;
            Ok(Ack::from_bool(!self.absent))
        }

        fn stop(&mut self) -> core::result::Result<(), ()> {
            self.log.push(Stop).map_err(|_| ())
        }

        fn transmit(&mut self, byte: u8) -> core::result::Result<Ack, ()> {
            self.log.push(Byte(byte)).map_err(|_| ())?;
            Ok(Ack::Ack)
        }

        fn receive(&mut self, _nack: bool) -> core::result::Result<u8, ()> {
            Err(())
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_us: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_us += u64::from(ns) / 1000;
        }
    }

    fn lcd() -> St7032<MockBus, MockDelay> {
        St7032::new(MockBus::default(), MockDelay::default())
    }

    fn commands(lcd: &mut St7032<MockBus, MockDelay>) -> Vec<Bus, 256> {
        core::mem::take(&mut lcd.bus.log)
    }

    #[test]
    fn test_init_sequence() {
        let mut lcd = lcd();
        lcd.init().unwrap();

        assert_eq!(
            &commands(&mut lcd)[..],
            &[
                Start(0x3E),
                Byte(0x80), Byte(0x39),
                Byte(0x80), Byte(0x14),
                Byte(0x80), Byte(0x78),
                Byte(0x80), Byte(0x5E),
                Byte(0x80), Byte(0x6C),
                Byte(0x80), Byte(0x38),
                Byte(0x80), Byte(0x0C),
                Byte(0x80), Byte(0x06),
                Byte(0x80), Byte(0x80),
                Byte(0x00), Byte(0x01),
                Stop,
            ]
        );
        assert_eq!(lcd.contrast(), 0x28);
        assert!(lcd.icons_enabled());
        assert_eq!(lcd.delay.total_us, 9 * 26 + 1080);
    }

    #[test]
    fn test_contrast_skips_unchanged() {
        let mut lcd = lcd();
        lcd.set_contrast(0x28).unwrap();
        assert!(commands(&mut lcd).is_empty());

        lcd.set_contrast(0x3F).unwrap();
        assert_eq!(
            &commands(&mut lcd)[..],
            &[
                Start(0x3E),
                Byte(0x80), Byte(0x39),
                Byte(0x80), Byte(0x7F),
                Byte(0x80), Byte(0x5F),
                Byte(0x00), Byte(0x38),
                Stop,
            ]
        );
        assert_eq!(lcd.contrast(), 0x3F);
        assert!(lcd.icons_enabled());
    }

    #[test]
    fn test_set_cursor_addresses_second_row() {
        let mut lcd = lcd();
        assert_eq!(lcd.set_cursor(1, 5), Ok(true));
        assert_eq!(
            &commands(&mut lcd)[..],
            &[Start(0x3E), Byte(0x00), Byte(0xC5), Stop]
        );
        assert_eq!((lcd.cursor_row(), lcd.cursor_col()), (1, 5));
        assert_eq!(lcd.position(), 45);

        // Already there
        assert_eq!(lcd.set_cursor(1, 5), Ok(true));
        assert!(commands(&mut lcd).is_empty());
    }

    #[test]
    fn test_set_cursor_out_of_range() {
        let mut lcd = lcd();
        assert_eq!(lcd.set_cursor(2, 0), Ok(false));
        assert_eq!(lcd.set_cursor(0, 40), Ok(false));
        assert!(commands(&mut lcd).is_empty());
        assert_eq!(lcd.position(), 0);
    }

    #[test]
    fn test_cursor_left_right_bounds() {
        let mut lcd = lcd();
        assert_eq!(lcd.cursor_left(), Ok(false));
        assert_eq!(lcd.cursor_right(), Ok(true));
        assert_eq!(lcd.position(), 1);

        lcd.set_cursor(1, 39).unwrap();
        assert_eq!(lcd.cursor_right(), Ok(false));
        assert_eq!(lcd.cursor_left(), Ok(true));
        assert_eq!((lcd.cursor_row(), lcd.cursor_col()), (1, 38));
    }

    #[test]
    fn test_write_bytes_advances_and_wraps() {
        let mut lcd = lcd();
        lcd.write_str("Hi").unwrap();
        assert_eq!(
            &commands(&mut lcd)[..],
            &[Start(0x3E), Byte(0x40), Byte(b'H'), Byte(b'i'), Stop]
        );
        assert_eq!(lcd.position(), 2);

        lcd.set_cursor(1, 38).unwrap();
        lcd.write_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(lcd.position(), 1);
    }

    #[test]
    fn test_write_cgram_masks_and_restores_cursor() {
        let mut lcd = lcd();
        lcd.set_cursor(0, 3).unwrap();
        commands(&mut lcd);

        lcd.write_cgram(9, &[0xFF, 0x11, 0, 0, 0, 0, 0, 0x20]).unwrap();

        assert_eq!(
            &commands(&mut lcd)[..],
            &[
                Start(0x3E),
                Byte(0x80), Byte(0x38),
                Byte(0x80), Byte(0x48),
                Byte(0x40),
                Byte(0x1F), Byte(0x11), Byte(0), Byte(0), Byte(0), Byte(0), Byte(0), Byte(0),
                Stop,
                Start(0x3E), Byte(0x00), Byte(0x83), Stop,
            ]
        );
        assert_eq!(lcd.position(), 3);
    }

    #[test]
    fn test_write_icon() {
        let mut lcd = lcd();
        lcd.write_icon(0x1A, 0xFF).unwrap();

        assert_eq!(
            &commands(&mut lcd)[..],
            &[
                Start(0x3E),
                Byte(0x80), Byte(0x39),
                Byte(0x80), Byte(0x4A),
                Byte(0x80), Byte(0x38),
                Byte(0x40), Byte(0x1F),
                Stop,
                Start(0x3E), Byte(0x00), Byte(0x80), Stop,
            ]
        );
    }

    #[test]
    fn test_clear_icons_writes_sixteen_zeros() {
        let mut lcd = lcd();
        lcd.clear_icons().unwrap();

        let log = commands(&mut lcd);
        let zeros = log.iter().filter(|&&b| b == Byte(0)).count();
        // 16 icon bytes plus two last-command control bytes
        assert_eq!(zeros, 18);
        assert_eq!(log.iter().filter(|&&b| b == Stop).count(), 3);
    }

    #[test]
    fn test_icon_display_toggle() {
        let mut lcd = lcd();
        lcd.set_icon_display(true).unwrap();
        assert!(commands(&mut lcd).is_empty());

        lcd.set_icon_display(false).unwrap();
        assert_eq!(
            &commands(&mut lcd)[..],
            &[
                Start(0x3E),
                Byte(0x80), Byte(0x39),
                Byte(0x80), Byte(0x56),
                Byte(0x00), Byte(0x38),
                Stop,
            ]
        );
        assert!(!lcd.icons_enabled());
        assert_eq!(lcd.contrast(), 0x28);
    }

    #[test]
    fn test_display_settings() {
        let mut lcd = lcd();
        lcd.set_display_settings(true, false, true).unwrap();
        assert_eq!(
            &commands(&mut lcd)[..],
            &[Start(0x3E), Byte(0x00), Byte(0x0D), Stop]
        );
    }

    #[test]
    fn test_clear_display_homes_cursor() {
        let mut lcd = lcd();
        lcd.set_cursor(1, 1).unwrap();
        lcd.clear_display().unwrap();
        assert_eq!(lcd.position(), 0);
    }

    #[test]
    fn test_missing_device() {
        let mut lcd = lcd();
        lcd.bus.absent = true;
        assert_eq!(lcd.init(), Err(St7032Error::NoAcknowledge));
        assert_eq!(&commands(&mut lcd)[..], &[Start(0x3E), Stop]);
    }
}
