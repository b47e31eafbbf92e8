//! Main-loop dispatcher
//!
//! Drains the pending event set and turns each event into LCD commands.
//! Register values are read under the critical section at the moment each
//! event is handled, so a write that lands between two handlers is picked
//! up; an event raised again meanwhile stays pending for the next poll.

use embedded_hal::delay::DelayNs;

use crate::critical::{CriticalSection, InterruptControl, Shared};
use crate::events::{Event, EventSet};
use crate::register::{CGRAM_SLOTS, GLYPH_ROWS, ICON_COUNT, POWER_BACKLIGHT, POWER_PANEL};
use crate::state::AppState;
use crate::traits::{LcdController, PanelPower};

/// Supply off time when power-cycling the panel
pub const POWER_OFF_HOLD_MS: u32 = 1;

/// Wait after switching the panel supply on, before talking to it
pub const POWER_ON_SETTLE_MS: u32 = 40;

/// First LCD failure of a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchError<E> {
    /// Event whose handler failed
    pub event: Event,
    pub error: E,
}

/// Event dispatcher owning the LCD and its power switches
pub struct Dispatcher<L, P, D> {
    lcd: L,
    power: P,
    delay: D,
}

impl<L, P, D> Dispatcher<L, P, D>
where
    L: LcdController,
    P: PanelPower,
    D: DelayNs,
{
    pub fn new(lcd: L, power: P, delay: D) -> Self {
        Self { lcd, power, delay }
    }

    /// Power-on sequence: panel on, backlight off, settle, initialize
    pub fn start(&mut self) -> Result<(), L::Error> {
        self.power.set_panel(true);
        self.power.set_backlight(false);
        self.delay.delay_ms(POWER_ON_SETTLE_MS);
        self.lcd.init()
    }

    /// One main-loop iteration
    ///
    /// Returns the drained set; an empty set means nothing was pending and
    /// the status register is back at NORMAL. A failing handler does not
    /// stop the others; the first failure is reported.
    pub fn poll<I: InterruptControl>(
        &mut self,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<EventSet, DispatchError<L::Error>> {
        let events = state.lock(section, |s| s.take_events());

        let mut first_error = None;
        for event in events.dispatchable() {
            if let Err(error) = self.handle(event, state, section) {
                if first_error.is_none() {
                    first_error = Some(DispatchError { event, error });
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(events),
        }
    }

    fn handle<I: InterruptControl>(
        &mut self,
        event: Event,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<(), L::Error> {
        match event {
            Event::PowerContrast => self.apply_power(state, section),
            Event::CursorSet => {
                let (visible, blink) =
                    state.lock(section, |s| (s.map.cursor_visible(), s.map.cursor_blink()));
                self.lcd.set_display_settings(true, visible, blink)
            }
            Event::CursorDraw => self.draw_cursor(state, section),
            Event::DrawLine0 => self.draw_line(0, state, section),
            Event::DrawLine1 => self.draw_line(1, state, section),
            Event::SetCgram => self.draw_cgram(state, section),
            Event::DrawIcon => self.draw_icons(state, section),
            Event::Timer => Ok(()),
        }
    }

    /// Bring the pins in line with the power register, then push contrast
    ///
    /// A cleared panel bit power-cycles and re-initializes the controller,
    /// after which the register reads panel-on again.
    fn apply_power<I: InterruptControl>(
        &mut self,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<(), L::Error> {
        let previous = state.lock(section, |s| {
            let power = s.map.power;
            s.map.power |= POWER_PANEL;
            power
        });

        if previous & POWER_PANEL == 0 {
            self.power.set_panel(false);
            self.delay.delay_ms(POWER_OFF_HOLD_MS);
            self.power.set_panel(true);
            self.delay.delay_ms(POWER_ON_SETTLE_MS);
            self.lcd.init()?;
        }
        self.power.set_backlight(previous & POWER_BACKLIGHT != 0);

        let contrast = state.lock(section, |s| s.map.contrast);
        self.lcd.set_contrast(contrast)
    }

    fn draw_cursor<I: InterruptControl>(
        &mut self,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<(), L::Error> {
        let (row, col) = state.lock(section, |s| (s.map.cursor_row, s.map.cursor_col));
        self.lcd.set_cursor(row, col)?;
        Ok(())
    }

    /// Rewrite the visible part of a row
    ///
    /// The controller's address counter moves while writing, so the host
    /// cursor is put back afterwards.
    fn draw_line<I: InterruptControl>(
        &mut self,
        row: u8,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<(), L::Error> {
        let line = state.lock(section, |s| s.map.visible_line(row));
        self.lcd.set_cursor(row, 0)?;
        self.lcd.write_bytes(&line)?;
        self.draw_cursor(state, section)
    }

    /// Push every glyph slot the host has defined
    fn draw_cgram<I: InterruptControl>(
        &mut self,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<(), L::Error> {
        let glyphs: [Option<[u8; GLYPH_ROWS]>; CGRAM_SLOTS] = state.lock(section, |s| {
            core::array::from_fn(|slot| s.map.glyph_defined(slot).then(|| s.map.glyph(slot)))
        });

        for (slot, glyph) in glyphs.iter().enumerate() {
            if let Some(glyph) = glyph {
                self.lcd.write_cgram(slot as u8, glyph)?;
            }
        }
        Ok(())
    }

    /// Rewrite all icon bytes
    fn draw_icons<I: InterruptControl>(
        &mut self,
        state: &Shared<AppState>,
        section: &CriticalSection<I>,
    ) -> Result<(), L::Error> {
        let icons: [u8; ICON_COUNT] = state.lock(section, |s| s.map.icons);
        for (address, bits) in icons.iter().enumerate() {
            self.lcd.write_icon(address as u8, *bits)?;
        }
        Ok(())
    }

    pub fn lcd(&self) -> &L {
        &self.lcd
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    /// Give back the owned peripherals
    pub fn release(self) -> (L, P, D) {
        (self.lcd, self.power, self.delay)
    }
}
