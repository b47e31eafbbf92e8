//! Host link: I2C slave task
//!
//! Translates the embassy slave driver's transaction-level commands into
//! the byte-level events the protocol engine expects. The controller
//! acknowledges every written byte in hardware, so a byte the engine
//! rejects is logged and the rest of that write is dropped. A write longer
//! than the buffer still delivers the bytes that fit.

use defmt::*;
use embassy_rp::i2c_slave::{Command, Error, I2cSlave, ReadStatus};
use embassy_rp::peripherals::I2C0;
use panelbridge_core::protocol::{SharedSlave, MAX_WRITE_LEN};
use panelbridge_hal::{BusId, SlaveEvent, SlaveHandler};

use crate::board::CortexM;
use crate::channels::EVENTS_PENDING;
use crate::{CS, STATE};

/// Host bus
const HOST_BUS: BusId = BusId(0);

/// Idle byte when the engine has nothing to send
const IDLE: u8 = 0xFF;

#[embassy_executor::task]
pub async fn slave_task(mut dev: I2cSlave<'static, I2C0>) {
    info!("Slave task started");

    let mut handler = SharedSlave::new(&STATE, &CS);
    let mut buf = [0u8; MAX_WRITE_LEN];

    loop {
        match dev.listen(&mut buf).await {
            Ok(Command::Write(len)) => {
                receive(&mut handler, &buf[..len]);
            }
            Ok(Command::WriteRead(len)) => {
                receive(&mut handler, &buf[..len]);
                transmit(&mut handler, &mut dev).await;
            }
            Ok(Command::Read) => {
                transmit(&mut handler, &mut dev).await;
            }
            Ok(Command::GeneralCall(len)) => {
                debug!("Ignoring general call ({} bytes)", len);
            }
            Err(Error::PartialWrite(len)) => {
                warn!("Write overran {} bytes, applying what fit", MAX_WRITE_LEN);
                receive(&mut handler, &buf[..len.min(MAX_WRITE_LEN)]);
            }
            Err(e) => {
                warn!("Slave bus error: {}", e);
                handler.on_slave_event(HOST_BUS, SlaveEvent::BusError);
            }
        }

        if STATE.lock(&CS, |state| !state.pending().is_empty()) {
            EVENTS_PENDING.signal(());
        }
    }
}

/// Feed a master write to the engine
fn receive(handler: &mut SharedSlave<'static, CortexM>, data: &[u8]) {
    if let Some(i) = handler.receive_write(HOST_BUS, data) {
        warn!("NACK byte {} ({:#04x}), dropping {} more", i, data[i], data.len() - i - 1);
    }
}

/// Serve a master read one byte at a time until the master NACKs
async fn transmit(
    handler: &mut SharedSlave<'static, CortexM>,
    dev: &mut I2cSlave<'static, I2C0>,
) {
    let mut reply = handler.on_slave_event(HOST_BUS, SlaveEvent::ReadAddress);

    loop {
        let byte = reply.data.unwrap_or(IDLE);
        match dev.respond_to_read(&[byte]).await {
            Ok(ReadStatus::NeedMoreBytes) => {
                reply = handler.on_slave_event(HOST_BUS, SlaveEvent::ReadAck);
            }
            Ok(ReadStatus::Done) | Ok(ReadStatus::LeftoverBytes(_)) => {
                handler.on_slave_event(HOST_BUS, SlaveEvent::ReadNack);
                break;
            }
            Err(e) => {
                warn!("Slave read error: {}", e);
                handler.on_slave_event(HOST_BUS, SlaveEvent::BusError);
                break;
            }
        }
    }
}
