//! RP2040 glue for the board-agnostic traits

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;
use panelbridge_core::critical::InterruptControl;
use panelbridge_hal::{OutputPin, PinDescriptor, Port, PortIo};

use crate::config::pin_descriptor;

/// Global interrupt mask of the Cortex-M0+ core
pub struct CortexM;

impl InterruptControl for CortexM {
    fn disable(&self) {
        cortex_m::interrupt::disable();
    }

    fn enable(&self) {
        // SAFETY: only reached when the outermost section ends
        unsafe { cortex_m::interrupt::enable() }
    }
}

/// Push-pull output for the power and backlight switches
pub struct RpOutput(Output<'static>);

impl RpOutput {
    pub fn new(pin: Peri<'static, AnyPin>) -> Self {
        Self(Output::new(pin, Level::Low))
    }
}

impl OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Bank-0 GPIOs not claimed by the I2C buses, taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; 30],
}

impl PinBank {
    pub fn new(pins: [Option<Peri<'static, AnyPin>>; 30]) -> Self {
        Self { pins }
    }

    /// Take GPIO `n`
    ///
    /// # Panics
    /// If the pin does not exist or was already taken; bridge.toml is
    /// checked for both at build time.
    pub fn take(&mut self, n: u8) -> Peri<'static, AnyPin> {
        match self.pins.get_mut(usize::from(n)).and_then(Option::take) {
            Some(pin) => pin,
            None => defmt::panic!("GPIO{} unavailable", n),
        }
    }
}

/// Keypad matrix pins seen as 8-bit ports
///
/// Rows are outputs, columns are inputs with pull-downs. Only matrix pins
/// are visible; other bits of a port read as 0.
pub struct MatrixPorts {
    rows: [(PinDescriptor, Output<'static>); 4],
    cols: [(PinDescriptor, Input<'static>); 4],
}

impl MatrixPorts {
    pub fn new(bank: &mut PinBank, rows: [u8; 4], cols: [u8; 4]) -> Self {
        Self {
            rows: rows.map(|n| (pin_descriptor(n), Output::new(bank.take(n), Level::Low))),
            cols: cols.map(|n| (pin_descriptor(n), Input::new(bank.take(n), Pull::Down))),
        }
    }
}

impl PortIo for MatrixPorts {
    fn read_port(&mut self, port: Port) -> u8 {
        let rows = self
            .rows
            .iter()
            .filter(|(pin, out)| pin.port == port && out.is_set_high())
            .fold(0, |bits, (pin, _)| bits | pin.mask);
        let cols = self
            .cols
            .iter()
            .filter(|(pin, input)| pin.port == port && input.is_high())
            .fold(0, |bits, (pin, _)| bits | pin.mask);
        rows | cols
    }

    fn set_bits(&mut self, port: Port, mask: u8) {
        for (pin, out) in self.rows.iter_mut() {
            if pin.port == port && pin.mask & mask != 0 {
                out.set_high();
            }
        }
    }

    fn clear_bits(&mut self, port: Port, mask: u8) {
        for (pin, out) in self.rows.iter_mut() {
            if pin.port == port && pin.mask & mask != 0 {
                out.set_low();
            }
        }
    }
}
