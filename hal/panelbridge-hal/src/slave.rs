//! I2C slave abstractions
//!
//! A slave transport delivers one [`SlaveEvent`] per bus phase and holds the
//! clock stretched until the handler returns a [`SlaveReply`]. Handlers run
//! in interrupt context and must not block.

/// Identifies a physical I2C unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusId(pub u8);

/// One slave-side bus phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveEvent {
    /// Our address was received with the write bit
    WriteAddress,
    /// A data byte was written by the master
    WriteData(u8),
    /// Our address was received with the read bit; first byte requested
    ReadAddress,
    /// The master acknowledged the previous byte and wants another
    ReadAck,
    /// The master did not acknowledge; the read is over
    ReadNack,
    /// Bus collision or other error
    BusError,
}

impl SlaveEvent {
    pub const WRITE_ADDRESS: u8 = 0b0000_0001;
    pub const WRITE_DATA: u8 = 0b0010_0001;
    pub const READ_ADDRESS: u8 = 0b0000_0101;
    pub const READ_ACK: u8 = 0b0010_0100;
    pub const READ_NACK: u8 = 0b0110_0100;
    pub const BUS_ERROR: u8 = 0b1111_1111;

    /// Decode a transport status code
    ///
    /// The code packs the R/W, D/A, BF and ACKSTAT flags of the peripheral.
    /// `data` is the received byte and is only used for write data.
    pub const fn from_status(code: u8, data: u8) -> Option<Self> {
        match code {
            Self::WRITE_ADDRESS => Some(SlaveEvent::WriteAddress),
            Self::WRITE_DATA => Some(SlaveEvent::WriteData(data)),
            Self::READ_ADDRESS => Some(SlaveEvent::ReadAddress),
            Self::READ_ACK => Some(SlaveEvent::ReadAck),
            Self::READ_NACK => Some(SlaveEvent::ReadNack),
            Self::BUS_ERROR => Some(SlaveEvent::BusError),
            _ => None,
        }
    }

    /// Transport status code for this event
    pub const fn code(&self) -> u8 {
        match self {
            SlaveEvent::WriteAddress => Self::WRITE_ADDRESS,
            SlaveEvent::WriteData(_) => Self::WRITE_DATA,
            SlaveEvent::ReadAddress => Self::READ_ADDRESS,
            SlaveEvent::ReadAck => Self::READ_ACK,
            SlaveEvent::ReadNack => Self::READ_NACK,
            SlaveEvent::BusError => Self::BUS_ERROR,
        }
    }

    /// True for phases where the master expects a byte from us
    pub const fn wants_data(&self) -> bool {
        matches!(self, SlaveEvent::ReadAddress | SlaveEvent::ReadAck)
    }
}

/// Handler answer for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveReply {
    /// Acknowledge to send for a received byte
    pub ack: bool,
    /// Byte to shift out on read phases
    pub data: Option<u8>,
}

impl SlaveReply {
    /// Accept a received byte
    pub const fn ack() -> Self {
        Self {
            ack: true,
            data: None,
        }
    }

    /// Reject a received byte
    pub const fn nack() -> Self {
        Self {
            ack: false,
            data: None,
        }
    }

    /// Respond to a read phase
    pub const fn data(byte: u8) -> Self {
        Self {
            ack: true,
            data: Some(byte),
        }
    }
}

/// Slave-side event handler
///
/// Exactly one handler is installed per slave bus. It is called
/// synchronously for every event and must finish quickly since the bus is
/// stalled meanwhile.
pub trait SlaveHandler {
    fn on_slave_event(&mut self, bus: BusId, event: SlaveEvent) -> SlaveReply;
}
