//! Timer tick task
//!
//! Advances the application timer and scans the keypad at the configured
//! tick rate.

use defmt::*;
use embassy_time::{Duration, Ticker};
use panelbridge_core::keypad::Keypad;
use panelbridge_core::timer::TickHandler;

use crate::board::MatrixPorts;
use crate::channels::EVENTS_PENDING;
use crate::{CS, STATE};

#[embassy_executor::task]
pub async fn tick_task(mut keypad: Keypad<MatrixPorts>, mut handler: TickHandler, tick_hz: u32) {
    info!("Tick task started at {} Hz", tick_hz);

    let mut ticker = Ticker::every(Duration::from_hz(u64::from(tick_hz)));

    loop {
        ticker.next().await;

        let (key, pending) = STATE.lock(&CS, |state| {
            let key = handler.on_tick(state, &mut keypad);
            (key, !state.pending().is_empty())
        });

        if let Some(code) = key {
            debug!("Key {}", code);
        }
        if pending {
            EVENTS_PENDING.signal(());
        }
    }
}
