//! Per-transaction slave state machine

use panelbridge_hal::{SlaveEvent, SlaveReply};

use crate::register::MAP_SIZE;
use crate::state::AppState;

/// Filler shifted out when the cursor has run off the map
const IDLE_BYTE: u8 = 0xFF;

/// Transfer cursor and address-phase tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveEngine {
    /// Next data byte selects the register
    write_start: bool,
    /// Current register address
    map_addr: u8,
}

impl SlaveEngine {
    pub const fn new() -> Self {
        Self {
            write_start: false,
            map_addr: 0,
        }
    }

    /// Register the next byte will be read from or written to
    pub fn map_addr(&self) -> u8 {
        self.map_addr
    }

    /// Whether the next write byte is an address byte
    pub fn awaiting_address(&self) -> bool {
        self.write_start
    }

    /// Handle one bus event against the shared state
    ///
    /// Must be called with interrupts masked.
    pub fn handle(&mut self, state: &mut AppState, event: SlaveEvent) -> SlaveReply {
        match event {
            SlaveEvent::WriteAddress => {
                self.write_start = true;
                SlaveReply::ack()
            }
            SlaveEvent::WriteData(byte) => {
                let reply = self.receive(state, byte);
                self.write_start = false;
                reply
            }
            SlaveEvent::ReadAddress | SlaveEvent::ReadAck => self.transmit(state),
            SlaveEvent::ReadNack => SlaveReply::ack(),
            SlaveEvent::BusError => {
                self.write_start = false;
                SlaveReply::ack()
            }
        }
    }

    fn receive(&mut self, state: &mut AppState, byte: u8) -> SlaveReply {
        if self.write_start {
            if byte >= MAP_SIZE {
                return SlaveReply::nack();
            }
            self.map_addr = byte;
            return SlaveReply::ack();
        }

        match state.write(self.map_addr, byte) {
            Ok(()) => {
                self.map_addr += 1;
                SlaveReply::ack()
            }
            Err(_) => SlaveReply::nack(),
        }
    }

    fn transmit(&mut self, state: &mut AppState) -> SlaveReply {
        match state.read(self.map_addr) {
            Some(value) => {
                self.map_addr += 1;
                SlaveReply::data(value)
            }
            None => SlaveReply {
                ack: false,
                data: Some(IDLE_BYTE),
            },
        }
    }
}
