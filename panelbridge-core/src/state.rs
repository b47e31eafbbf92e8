//! Application state shared between interrupt handlers and the main loop
//!
//! Lives in a [`Shared`](crate::critical::Shared) cell; every method here
//! runs with interrupts masked.

use crate::events::{Event, EventSet};
use crate::register::{Rejected, RegisterMap, Status};

/// Register map plus the pending event set
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppState {
    pub map: RegisterMap,
    events: EventSet,
}

impl AppState {
    pub const fn new() -> Self {
        Self {
            map: RegisterMap::new(),
            events: EventSet::empty(),
        }
    }

    /// Mark work as pending and report PROCESSING
    pub fn raise(&mut self, event: Event) {
        self.map.status = Status::Processing;
        self.events.insert(event);
    }

    /// Drain the pending set
    ///
    /// An empty drain is what moves the status back to NORMAL, so the host
    /// sees PROCESSING until the main loop has found nothing left to do.
    pub fn take_events(&mut self) -> EventSet {
        if self.events.is_empty() {
            self.map.status = Status::Normal;
        }
        self.events.take()
    }

    /// Pending events without draining
    pub fn pending(&self) -> EventSet {
        self.events
    }

    /// Host write: update the register and raise its event if it changed
    pub fn write(&mut self, address: u8, value: u8) -> Result<(), Rejected> {
        if let Some(event) = self.map.write(address, value)? {
            self.raise(event);
        }
        Ok(())
    }

    /// Host read, with read-clear on the key register
    pub fn read(&mut self, address: u8) -> Option<u8> {
        self.map.read(address)
    }

    /// Publish a confirmed key press
    pub fn set_key(&mut self, key: u8) {
        self.map.key = key;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{CONTRAST, DISPLAY_BASE, STATUS};

    #[test]
    fn test_raise_sets_processing() {
        let mut state = AppState::new();
        state.raise(Event::Timer);
        assert_eq!(state.map.status, Status::Processing);
        assert!(state.pending().contains(Event::Timer));
    }

    #[test]
    fn test_status_returns_to_normal_on_empty_drain() {
        let mut state = AppState::new();
        state.raise(Event::DrawIcon);

        let events = state.take_events();
        assert!(events.contains(Event::DrawIcon));
        // Drained but not yet observed empty
        assert_eq!(state.map.status, Status::Processing);

        assert!(state.take_events().is_empty());
        assert_eq!(state.map.status, Status::Normal);
        assert_eq!(state.read(STATUS), Some(0));
    }

    #[test]
    fn test_write_raises_only_on_change() {
        let mut state = AppState::new();
        state.write(CONTRAST, 0x28).unwrap();
        assert!(state.pending().is_empty());
        assert_eq!(state.map.status, Status::Normal);

        state.write(DISPLAY_BASE, b'A').unwrap();
        assert!(state.pending().contains(Event::DrawLine0));
        assert_eq!(state.read(STATUS), Some(1));
    }

    #[test]
    fn test_rejected_write_raises_nothing() {
        let mut state = AppState::new();
        assert_eq!(state.write(CONTRAST, 64), Err(Rejected::InvalidValue));
        assert!(state.pending().is_empty());
    }
}
