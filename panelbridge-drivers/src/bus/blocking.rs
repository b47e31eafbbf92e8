//! Byte-phase master over a blocking I2C bus
//!
//! The LCD driver speaks in start/byte/stop phases while `embedded-hal`
//! buses take whole transactions. [`BlockingMaster`] collects the bytes of a
//! write between start and stop and hands them to the bus in one call.
//! The bus only reports acknowledgement per transaction, so every byte is
//! assumed acknowledged until the flush; an address NACK then surfaces as a
//! bus error.

use embedded_hal::i2c::I2c;
use heapless::Vec;
use panelbridge_hal::{Ack, I2cMaster};

/// Largest write that can be collected between start and stop
pub const MAX_TRANSFER: usize = 96;

/// Errors from the buffered master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterError<E> {
    /// The underlying bus failed
    Bus(E),
    /// More than [`MAX_TRANSFER`] bytes between start and stop
    Overflow,
    /// Byte-wise reads are not supported
    Unsupported,
}

/// Buffers start/byte/stop phases into `embedded-hal` writes
pub struct BlockingMaster<I> {
    i2c: I,
    address: Option<u8>,
    buffer: Vec<u8, MAX_TRANSFER>,
}

impl<I: I2c> BlockingMaster<I> {
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: None,
            buffer: Vec::new(),
        }
    }

    /// Give back the bus; a write that was never stopped is dropped
    pub fn release(self) -> I {
        self.i2c
    }

    fn flush(&mut self) -> Result<(), MasterError<I::Error>> {
        let Some(address) = self.address.take() else {
            return Ok(());
        };
        let result = self.i2c.write(address, &self.buffer);
        self.buffer.clear();
        result.map_err(MasterError::Bus)
    }
}

impl<I: I2c> I2cMaster for BlockingMaster<I> {
    type Error = MasterError<I::Error>;

    fn start(&mut self, address: u8, read: bool) -> Result<Ack, Self::Error> {
        // Repeated start: the previous write goes out first
        self.flush()?;
        if read {
            return Err(MasterError::Unsupported);
        }
        self.address = Some(address);
        Ok(Ack::Ack)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }

    fn transmit(&mut self, byte: u8) -> Result<Ack, Self::Error> {
        if self.address.is_none() {
            return Ok(Ack::Nack);
        }
        self.buffer.push(byte).map_err(|_| MasterError::Overflow)?;
        Ok(Ack::Ack)
    }

    fn receive(&mut self, _nack: bool) -> Result<u8, Self::Error> {
        Err(MasterError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Default)]
    struct MockI2c {
        writes: Vec<(u8, Vec<u8, MAX_TRANSFER>), 8>,
        absent: bool,
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if self.absent {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        let data = Vec::from_slice(bytes).map_err(|_| ErrorKind::Other)?;
                        self.writes.push((address, data)).map_err(|_| ErrorKind::Other)?;
                    }
                    Operation::Read(_) => return Err(ErrorKind::Other),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_is_sent_on_stop() {
        let mut master = BlockingMaster::new(MockI2c::default());

        assert_eq!(master.start(0x3E, false), Ok(Ack::Ack));
        master.transmit(0x00).unwrap();
        master.transmit(0x01).unwrap();
        assert!(master.i2c.writes.is_empty());

        master.stop().unwrap();
        assert_eq!(master.i2c.writes.len(), 1);
        assert_eq!(master.i2c.writes[0].0, 0x3E);
        assert_eq!(&master.i2c.writes[0].1[..], &[0x00, 0x01]);
    }

    #[test]
    fn test_provided_write() {
        let mut master = BlockingMaster::new(MockI2c::default());
        assert_eq!(master.write(0x3E, &[0x40, b'A', b'B']), Ok(Ack::Ack));

        let i2c = master.release();
        assert_eq!(&i2c.writes[0].1[..], &[0x40, b'A', b'B']);
    }

    #[test]
    fn test_repeated_start_flushes() {
        let mut master = BlockingMaster::new(MockI2c::default());

        master.start(0x3E, false).unwrap();
        master.transmit(0x80).unwrap();
        master.start(0x3F, false).unwrap();
        master.transmit(0x40).unwrap();
        master.stop().unwrap();

        let i2c = master.release();
        assert_eq!(i2c.writes.len(), 2);
        assert_eq!(i2c.writes[0].0, 0x3E);
        assert_eq!(i2c.writes[1].0, 0x3F);
    }

    #[test]
    fn test_stop_without_start() {
        let mut master = BlockingMaster::new(MockI2c::default());
        assert_eq!(master.transmit(0x12), Ok(Ack::Nack));
        assert_eq!(master.stop(), Ok(()));
        assert!(master.i2c.writes.is_empty());
    }

    #[test]
    fn test_overflow() {
        let mut master = BlockingMaster::new(MockI2c::default());
        master.start(0x3E, false).unwrap();
        for _ in 0..MAX_TRANSFER {
            master.transmit(0).unwrap();
        }
        assert_eq!(master.transmit(0), Err(MasterError::Overflow));
    }

    #[test]
    fn test_reads_unsupported() {
        let mut master = BlockingMaster::new(MockI2c::default());
        assert_eq!(master.start(0x3E, true), Err(MasterError::Unsupported));
        assert_eq!(master.receive(true), Err(MasterError::Unsupported));
    }

    #[test]
    fn test_missing_device_reported_at_stop() {
        let mut master = BlockingMaster::new(MockI2c {
            absent: true,
            ..Default::default()
        });
        master.start(0x3E, false).unwrap();
        master.transmit(0x00).unwrap();
        assert_eq!(
            master.stop(),
            Err(MasterError::Bus(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address
            )))
        );
        // Buffer is cleared for the next transfer
        assert_eq!(master.stop(), Ok(()));
    }
}
