//! Slave handler bound to the interrupt-shared state

use panelbridge_hal::{BusId, SlaveEvent, SlaveHandler, SlaveReply};

use super::SlaveEngine;
use crate::critical::{CriticalSection, InterruptControl, Shared};
use crate::state::AppState;

/// [`SlaveHandler`] that runs the engine inside a critical section
///
/// Each event is handled atomically with respect to the tick handler and
/// the dispatcher.
pub struct SharedSlave<'a, I> {
    engine: SlaveEngine,
    state: &'a Shared<AppState>,
    section: &'a CriticalSection<I>,
}

impl<'a, I: InterruptControl> SharedSlave<'a, I> {
    pub fn new(state: &'a Shared<AppState>, section: &'a CriticalSection<I>) -> Self {
        Self {
            engine: SlaveEngine::new(),
            state,
            section,
        }
    }

    pub fn engine(&self) -> &SlaveEngine {
        &self.engine
    }

    /// Feed a whole master write: address phase, then one event per byte
    ///
    /// For transports that deliver a write in one piece. Stops at the first
    /// rejected byte and returns its index; later bytes are not applied.
    pub fn receive_write(&mut self, bus: BusId, data: &[u8]) -> Option<usize> {
        self.on_slave_event(bus, SlaveEvent::WriteAddress);
        data.iter()
            .position(|&byte| !self.on_slave_event(bus, SlaveEvent::WriteData(byte)).ack)
    }
}

impl<I: InterruptControl> SlaveHandler for SharedSlave<'_, I> {
    fn on_slave_event(&mut self, _bus: BusId, event: SlaveEvent) -> SlaveReply {
        let engine = &mut self.engine;
        self.state.lock(self.section, |state| engine.handle(state, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical::tests::section;
    use crate::events::Event;
    use crate::protocol::MAX_WRITE_LEN;
    use crate::register::{CONTRAST, DISPLAY_BASE, DISPLAY_SIZE, MAP_SIZE};

    const BUS: BusId = BusId(1);

    #[test]
    fn test_events_update_shared_state() {
        let cs = section();
        let state = Shared::new(AppState::new());
        let mut slave = SharedSlave::new(&state, &cs);

        slave.on_slave_event(BUS, SlaveEvent::WriteAddress);
        slave.on_slave_event(BUS, SlaveEvent::WriteData(DISPLAY_BASE + 40));
        let reply = slave.on_slave_event(BUS, SlaveEvent::WriteData(b'x'));

        assert!(reply.ack);
        assert_eq!(slave.engine().map_addr(), DISPLAY_BASE + 41);
        assert_eq!(cs.depth(), 0);

        let pending = state.lock(&cs, |s| s.pending());
        assert_eq!(pending, Event::DrawLine1.into());
    }

    #[test]
    fn test_out_of_range_contrast_is_nacked() {
        let cs = section();
        let state = Shared::new(AppState::new());
        let mut slave = SharedSlave::new(&state, &cs);

        slave.on_slave_event(BUS, SlaveEvent::WriteAddress);
        slave.on_slave_event(BUS, SlaveEvent::WriteData(CONTRAST));
        let reply = slave.on_slave_event(BUS, SlaveEvent::WriteData(64));

        assert_eq!(reply, SlaveReply::nack());
        assert_eq!(state.lock(&cs, |s| s.map.contrast), 0x28);
    }

    #[test]
    fn test_write_to_end_of_map_is_applied() {
        let cs = section();
        let state = Shared::new(AppState::new());
        let mut slave = SharedSlave::new(&state, &cs);

        // Address byte plus every register from the display to the end
        let mut write = [b'a'; MAX_WRITE_LEN];
        let len = 1 + usize::from(MAP_SIZE - DISPLAY_BASE);
        write[0] = DISPLAY_BASE;
        write[1 + DISPLAY_SIZE..len].fill(0x1F);

        assert_eq!(slave.receive_write(BUS, &write[..len]), None);
        assert_eq!(slave.engine().map_addr(), MAP_SIZE);

        let (display, icon) = state.lock(&cs, |s| (s.map.display, s.map.icons[15]));
        assert!(display.iter().all(|&c| c == b'a'));
        assert_eq!(icon, 0x1F);
    }

    #[test]
    fn test_whole_map_fits_one_write() {
        assert_eq!(MAX_WRITE_LEN, 1 + usize::from(MAP_SIZE));
    }

    #[test]
    fn test_write_stops_at_rejected_byte() {
        let cs = section();
        let state = Shared::new(AppState::new());
        let mut slave = SharedSlave::new(&state, &cs);

        assert_eq!(slave.receive_write(BUS, &[CONTRAST, 0x10, 64, 0x11]), Some(2));
        assert_eq!(state.lock(&cs, |s| s.map.contrast), 0x10);
        assert_eq!(slave.engine().map_addr(), CONTRAST + 1);
    }
}
