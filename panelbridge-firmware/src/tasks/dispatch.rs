//! Dispatcher task
//!
//! Owns the LCD and its power switches. Powers the panel up, then turns
//! pending events into LCD commands, sleeping while nothing is pending.

use defmt::*;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_time::Delay;
use panelbridge_core::dispatch::Dispatcher;
use panelbridge_drivers::bus::BlockingMaster;
use panelbridge_drivers::lcd::St7032;
use panelbridge_drivers::power::GpioPanelPower;

use crate::board::RpOutput;
use crate::channels::EVENTS_PENDING;
use crate::{CS, STATE};

pub type Lcd = St7032<BlockingMaster<I2c<'static, I2C1, Blocking>>, Delay>;
pub type Power = GpioPanelPower<RpOutput, RpOutput>;

#[embassy_executor::task]
pub async fn dispatch_task(mut dispatcher: Dispatcher<Lcd, Power, Delay>) {
    info!("Dispatch task started");

    match dispatcher.start() {
        Ok(()) => info!("LCD initialized"),
        Err(e) => error!("LCD init failed: {}", e),
    }

    loop {
        match dispatcher.poll(&STATE, &CS) {
            Ok(events) if events.is_empty() => EVENTS_PENDING.wait().await,
            Ok(events) => trace!("Dispatched {:#04x}", events.bits()),
            Err(e) => warn!("LCD update failed on {}: {}", e.event, e.error),
        }
    }
}
