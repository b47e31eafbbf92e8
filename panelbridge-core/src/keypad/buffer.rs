//! Capture FIFO for confirmed key codes

use heapless::Deque;

use super::BUFFER_CAPACITY;

/// Fixed-capacity FIFO that refuses new codes when full
#[derive(Debug, Clone, Default)]
pub struct KeyBuffer {
    codes: Deque<u8, BUFFER_CAPACITY>,
}

impl KeyBuffer {
    pub const fn new() -> Self {
        Self {
            codes: Deque::new(),
        }
    }

    /// Append a code; `false` if the buffer is full
    pub fn push(&mut self, code: u8) -> bool {
        self.codes.push_back(code).is_ok()
    }

    /// Remove the oldest code
    pub fn pop(&mut self) -> Option<u8> {
        self.codes.pop_front()
    }

    /// Newest code, emptying the buffer
    pub fn take_last(&mut self) -> Option<u8> {
        let last = self.codes.back().copied();
        self.codes.clear();
        last
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.codes.is_full()
    }
}
