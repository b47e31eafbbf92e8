//! Panelbridge - I2C LCD/Keypad Bridge Firmware
//!
//! Main firmware binary for RP2040-based bridge boards. An external I2C
//! master reads and writes a flat register block over the host bus; the
//! firmware mirrors it onto an ST7032 character LCD on a second bus and
//! publishes debounced keypad codes.
//!
//! Task layout:
//! - tick and slave tasks on a high-priority interrupt executor (the
//!   "interrupt context")
//! - dispatcher in thread mode (the "main loop")

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::gpio::AnyPin;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::i2c_slave::{self, I2cSlave};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::I2C0;
use embassy_rp::{bind_interrupts, Peri};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use panelbridge_core::config::BridgeConfig;
use panelbridge_core::critical::{CriticalSection, Shared};
use panelbridge_core::dispatch::Dispatcher;
use panelbridge_core::keypad::{Keypad, KeypadPins};
use panelbridge_core::register::CONTRAST;
use panelbridge_core::state::AppState;
use panelbridge_core::timer::TickHandler;
use panelbridge_drivers::bus::BlockingMaster;
use panelbridge_drivers::lcd::St7032;
use panelbridge_drivers::power::GpioPanelPower;

use crate::board::{CortexM, MatrixPorts, PinBank, RpOutput};
use crate::config::{
    bridge_config, pin_descriptor, BACKLIGHT_INVERTED, BACKLIGHT_PIN, KEYPAD_COLS, KEYPAD_ROWS,
    LCD_CONTRAST, PANEL_INVERTED, PANEL_PIN,
};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// Interrupt masking shared by every task
pub static CS: CriticalSection<CortexM> = CriticalSection::new(CortexM);

/// Register map and pending events
pub static STATE: Shared<AppState> = Shared::new(AppState::new());

/// Executor for the tick and slave tasks
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Every bank-0 GPIO except the I2C pins (GP0-GP3)
macro_rules! pin_bank {
    ($p:ident; $($pin:ident),*) => {
        PinBank::new([
            None, None, None, None,
            $(Some(Peri::<AnyPin>::from($p.$pin))),*
        ])
    };
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Panelbridge firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = match bridge_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid bridge configuration ({}), using defaults", e);
            BridgeConfig::default()
        }
    };
    info!(
        "Config: address={:#04x}, tick={} Hz, divider={}",
        config.slave_address, config.tick_hz, config.timer_divider
    );

    // Host bus: I2C0 slave on GP0 (SDA) / GP1 (SCL)
    let mut slave_config = i2c_slave::Config::default();
    slave_config.addr = u16::from(config.slave_address);
    let slave = I2cSlave::new(p.I2C0, p.PIN_1, p.PIN_0, Irqs, slave_config);
    info!("Host bus listening");

    // LCD bus: I2C1 blocking master on GP2 (SDA) / GP3 (SCL)
    let mut master_config = i2c::Config::default();
    master_config.frequency = config.master.mode.frequency();
    let master = I2c::new_blocking(p.I2C1, p.PIN_3, p.PIN_2, master_config);
    info!("LCD bus at {} Hz", master_config.frequency);

    let mut bank = pin_bank!(p;
        PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9, PIN_10, PIN_11, PIN_12, PIN_13,
        PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19, PIN_20, PIN_21, PIN_22, PIN_23,
        PIN_24, PIN_25, PIN_26, PIN_27, PIN_28, PIN_29
    );

    let power = GpioPanelPower::new(
        RpOutput::new(bank.take(PANEL_PIN)),
        PANEL_INVERTED,
        RpOutput::new(bank.take(BACKLIGHT_PIN)),
        BACKLIGHT_INVERTED,
    );
    let lcd = St7032::new(BlockingMaster::new(master), Delay);
    let dispatcher = Dispatcher::new(lcd, power, Delay);

    let pins = KeypadPins {
        rows: KEYPAD_ROWS.map(pin_descriptor),
        cols: KEYPAD_COLS.map(pin_descriptor),
    };
    let ports = MatrixPorts::new(&mut bank, KEYPAD_ROWS, KEYPAD_COLS);
    let keypad = Keypad::new(ports, pins, config.debounce);
    info!("Keypad rows {} cols {}", KEYPAD_ROWS, KEYPAD_COLS);

    // Queued before the dispatcher runs, so it is applied right after init
    if LCD_CONTRAST != panelbridge_core::config::DEFAULT_CONTRAST {
        if let Err(e) = STATE.lock(&CS, |state| state.write(CONTRAST, LCD_CONTRAST)) {
            warn!("Contrast {} rejected: {}", LCD_CONTRAST, e);
        }
    }

    // High-priority tasks stand in for the timer and I2C interrupts
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high.spawn(tasks::tick_task(keypad, TickHandler::from_config(&config), config.tick_hz))
        .unwrap();
    high.spawn(tasks::slave_task(slave)).unwrap();

    spawner.spawn(tasks::dispatch_task(dispatcher)).unwrap();

    info!("All tasks spawned, bridge running");
}
