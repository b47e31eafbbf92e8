//! Pending work flags
//!
//! Interrupt-side writers mark what changed; the main loop drains the whole
//! set at once and handles each flag in a fixed order. Raising a flag that
//! is already set is a no-op, so a burst of writes to one line costs one
//! redraw.

/// Kinds of deferred work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Periodic application timer
    Timer,
    /// Power/backlight or contrast register changed
    PowerContrast,
    /// Cursor visibility/blink changed
    CursorSet,
    /// Cursor row or column changed
    CursorDraw,
    /// Display RAM of row 0 changed
    DrawLine0,
    /// Display RAM of row 1 changed
    DrawLine1,
    /// A CGRAM glyph byte changed
    SetCgram,
    /// An icon byte changed
    DrawIcon,
}

impl Event {
    /// Events with an LCD handler, in handling order
    pub const DISPATCH_ORDER: [Event; 7] = [
        Event::PowerContrast,
        Event::CursorSet,
        Event::CursorDraw,
        Event::DrawLine0,
        Event::DrawLine1,
        Event::SetCgram,
        Event::DrawIcon,
    ];

    /// Flag bit of this event
    pub const fn bit(self) -> u8 {
        match self {
            Event::Timer => 0x01,
            Event::PowerContrast => 0x02,
            Event::CursorSet => 0x04,
            Event::CursorDraw => 0x08,
            Event::DrawLine0 => 0x10,
            Event::DrawLine1 => 0x20,
            Event::SetCgram => 0x40,
            Event::DrawIcon => 0x80,
        }
    }

    /// Redraw event for display row `row`
    pub const fn draw_line(row: u8) -> Self {
        if row == 0 {
            Event::DrawLine0
        } else {
            Event::DrawLine1
        }
    }
}

/// Set of pending events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventSet(u8);

impl EventSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn contains(&self, event: Event) -> bool {
        self.0 & event.bit() != 0
    }

    pub fn insert(&mut self, event: Event) {
        self.0 |= event.bit();
    }

    pub fn remove(&mut self, event: Event) {
        self.0 &= !event.bit();
    }

    /// Take every flag, leaving the set empty
    pub fn take(&mut self) -> EventSet {
        core::mem::take(self)
    }

    /// Set events that have a handler, in handling order
    pub fn dispatchable(self) -> impl Iterator<Item = Event> {
        Event::DISPATCH_ORDER
            .into_iter()
            .filter(move |event| self.contains(*event))
    }
}

impl From<Event> for EventSet {
    fn from(event: Event) -> Self {
        Self(event.bit())
    }
}

impl core::ops::BitOr<Event> for EventSet {
    type Output = EventSet;

    fn bitor(mut self, event: Event) -> EventSet {
        self.insert(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_disjoint() {
        let mut seen = 0u8;
        for event in Event::DISPATCH_ORDER.iter().chain([Event::Timer].iter()) {
            assert_eq!(seen & event.bit(), 0);
            seen |= event.bit();
        }
        assert_eq!(seen, 0xFF);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = EventSet::empty();
        set.insert(Event::DrawLine0);
        set.insert(Event::DrawLine0);
        assert_eq!(set.bits(), 0x10);
    }

    #[test]
    fn test_take_drains() {
        let mut set = EventSet::from(Event::Timer) | Event::DrawIcon;
        let taken = set.take();
        assert!(set.is_empty());
        assert!(taken.contains(Event::Timer));
        assert!(taken.contains(Event::DrawIcon));
    }

    #[test]
    fn test_dispatch_order_is_fixed() {
        let set = EventSet::from(Event::DrawIcon)
            | Event::Timer
            | Event::DrawLine1
            | Event::PowerContrast
            | Event::CursorDraw;

        let mut order = set.dispatchable();
        assert_eq!(order.next(), Some(Event::PowerContrast));
        assert_eq!(order.next(), Some(Event::CursorDraw));
        assert_eq!(order.next(), Some(Event::DrawLine1));
        assert_eq!(order.next(), Some(Event::DrawIcon));
        // Timer has no handler
        assert_eq!(order.next(), None);
    }

    #[test]
    fn test_draw_line_for_row() {
        assert_eq!(Event::draw_line(0), Event::DrawLine0);
        assert_eq!(Event::draw_line(1), Event::DrawLine1);
    }
}
