//! 4x4 matrix keypad
//!
//! Rows are driven high one at a time and the columns sampled; a pressed
//! key connects its row to its column. Raw scan codes go through a
//! run-length debouncer that also produces auto-repeat, and confirmed codes
//! can be collected in a small FIFO.
//!
//! Three ways to consume keys:
//! - [`Keypad::read`]: one scan, returns a code only on the scan that
//!   confirms (or repeats) a press
//! - [`Keypad::update_buffer`] + [`Keypad::read_buffer`]: FIFO of confirmed
//!   codes
//! - [`Keypad::read_final`]: newest buffered code, dropping the rest

mod buffer;
mod debounce;

pub use buffer::KeyBuffer;
pub use debounce::Debouncer;

use panelbridge_hal::{PinDescriptor, Port, PortIo};

use crate::config::DebounceThresholds;

/// Register value meaning "no key"
pub const NO_KEY: u8 = 0xFF;

pub const ROW_COUNT: usize = 4;
pub const COL_COUNT: usize = 4;

/// Capture buffer capacity
pub const BUFFER_CAPACITY: usize = 4;

/// Pin assignment of the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeypadPins {
    /// Driven high during the scan of their row
    pub rows: [PinDescriptor; ROW_COUNT],
    /// Sampled; read high while a key in the driven row is pressed
    pub cols: [PinDescriptor; COL_COUNT],
}

impl KeypadPins {
    /// Wiring of the reference board
    pub const REFERENCE: Self = Self {
        rows: [
            PinDescriptor::new(Port::A, 1),
            PinDescriptor::new(Port::A, 0),
            PinDescriptor::new(Port::A, 7),
            PinDescriptor::new(Port::A, 6),
        ],
        cols: [
            PinDescriptor::new(Port::A, 2),
            PinDescriptor::new(Port::A, 3),
            PinDescriptor::new(Port::A, 4),
            PinDescriptor::new(Port::B, 7),
        ],
    };
}

/// Keypad scanner with debounce and capture buffer
pub struct Keypad<P> {
    ports: P,
    pins: KeypadPins,
    debounce: Debouncer,
    buffer: KeyBuffer,
}

impl<P: PortIo> Keypad<P> {
    /// Create a keypad; all row pins are driven low
    pub fn new(mut ports: P, pins: KeypadPins, thresholds: DebounceThresholds) -> Self {
        for row in pins.rows {
            ports.clear_bits(row.port, row.mask);
        }
        Self {
            ports,
            pins,
            debounce: Debouncer::new(thresholds),
            buffer: KeyBuffer::new(),
        }
    }

    /// One raw matrix scan, `row * ROW_COUNT + col` of the first pressed key
    pub fn scan(&mut self) -> Option<u8> {
        let rows = self.pins.rows;
        for (row, pin) in rows.iter().enumerate() {
            self.ports.set_bits(pin.port, pin.mask);
            let col = self.active_column();
            self.ports.clear_bits(pin.port, pin.mask);

            if let Some(col) = col {
                return Some((row * ROW_COUNT + col) as u8);
            }
        }
        None
    }

    fn active_column(&mut self) -> Option<usize> {
        let ports = &mut self.ports;
        self.pins
            .cols
            .iter()
            .position(|&pin| ports.is_pin_high(pin))
    }

    /// Scan once and feed the debouncer
    ///
    /// Returns a code only on the scans where the debouncer reports it.
    pub fn read(&mut self) -> Option<u8> {
        let raw = self.scan();
        self.debounce.update(raw)
    }

    /// Scan once and buffer a confirmed code
    ///
    /// Returns `false` without scanning when the buffer is full, and
    /// `false` when the scan confirmed nothing.
    pub fn update_buffer(&mut self) -> bool {
        if self.buffer.is_full() {
            return false;
        }
        match self.read() {
            Some(code) => self.buffer.push(code),
            None => false,
        }
    }

    /// Oldest buffered code
    pub fn read_buffer(&mut self) -> Option<u8> {
        self.buffer.pop()
    }

    /// Newest buffered code; the rest of the buffer is discarded
    pub fn read_final(&mut self) -> Option<u8> {
        self.buffer.take_last()
    }

    /// Empty the buffer; debounce state is kept
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn pins(&self) -> &KeypadPins {
        &self.pins
    }

    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }
}
