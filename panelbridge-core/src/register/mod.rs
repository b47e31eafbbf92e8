//! Register map exposed on the slave bus
//!
//! A fixed 167-byte block. The host selects an address with the first byte
//! of a write and then reads or writes consecutive registers.
//!
//! | Address       | Register                           |
//! |---------------|------------------------------------|
//! | 0x00          | status (read-only)                 |
//! | 0x01          | key value (read clears)            |
//! | 0x02          | power: bit0 panel, bit1 backlight  |
//! | 0x03          | contrast 0..=63                    |
//! | 0x04          | cursor: bit0 visible, bit1 blink   |
//! | 0x05          | cursor row 0..=1                   |
//! | 0x06          | cursor column 0..=39               |
//! | 0x07..0x57    | display RAM, 2 x 40                |
//! | 0x57..0x97    | CGRAM, 8 glyphs x 8 rows           |
//! | 0x97..0xA7    | icon RAM, 16 bytes                 |

mod layout;
mod map;

pub use layout::*;
pub use map::{Rejected, RegisterMap, Status};
