//! Embassy async tasks
//!
//! The tick and slave tasks run on the high-priority interrupt executor and
//! stand in for the timer and I2C interrupt handlers. The dispatcher runs in
//! thread mode and may block on the LCD bus.

pub mod dispatch;
pub mod slave;
pub mod tick;

pub use dispatch::{dispatch_task, Lcd, Power};
pub use slave::slave_task;
pub use tick::tick_task;
