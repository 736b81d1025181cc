//! The core's bus boundary.
//!
//! Three ports, each modeled as a trait so that the surrounding
//! system supplies the transports: instruction fetch from program
//! memory, byte transactions with acknowledgement on the data bus,
//! and the peripheral I/O port with its per-bit write mask.
//!
//! The handshake details of the physical transports (ready/valid
//! signalling, wait states) live outside the core.  What the core
//! sees each tick is captured here: a fetch always returns a word, a
//! data-bus access may withhold acknowledgement (forcing a stall),
//! and an I/O write reports which bits the peripheral accepted.

/// Instruction fetch port.  Also used by the LPM class to read
/// program-memory bytes through the Z pointer.
pub trait ProgramMemory {
    /// Returns the 16-bit word at `word_address`.
    fn fetch(&mut self, word_address: u32) -> u16;
}

/// One byte transaction on the data bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataBusRequest {
    /// Byte address, already masked to the configured data width.
    pub address: u32,
    pub write: bool,
    /// Write data; ignored for reads.
    pub data: u8,
}

impl DataBusRequest {
    pub fn read(address: u32) -> DataBusRequest {
        DataBusRequest {
            address,
            write: false,
            data: 0,
        }
    }

    pub fn write(address: u32, data: u8) -> DataBusRequest {
        DataBusRequest {
            address,
            write: true,
            data,
        }
    }
}

/// The data-memory port.
///
/// `None` means the transaction was not acknowledged this tick; the
/// core stalls, commits nothing, and reissues the identical request
/// next tick.  An unacknowledged request must have no effect on the
/// device.  For an acknowledged write the returned byte carries no
/// information.
pub trait DataBus {
    fn access(&mut self, request: &DataBusRequest) -> Option<u8>;
}

/// The peripheral I/O port: 6-bit address space, byte reads, and
/// masked byte writes.  `write` returns the mask of bits the
/// peripheral actually accepted (a peripheral may refuse individual
/// bits).  I/O transactions always complete in one tick.
pub trait IoBus {
    fn read(&mut self, address: u8) -> u8;
    fn write(&mut self, address: u8, value: u8, mask: u8) -> u8;
}

/// Everything the core can touch during one tick, plus the interrupt
/// request lines sampled for this tick.
pub struct CoreBus<'a> {
    pub pmem: &'a mut dyn ProgramMemory,
    pub dmem: &'a mut dyn DataBus,
    pub io: &'a mut dyn IoBus,
    /// Pending interrupt request lines, bit 0 = highest priority.
    pub irq_pending: u32,
}
