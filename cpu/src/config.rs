//! Core configuration.
//!
//! The address widths are parameters of the design, not of the
//! instruction set: program addresses are PAW-bit word addresses,
//! data addresses are byte addresses up to the RAMP-extended width,
//! and the interrupt request vector is IRW bits wide.  A width which
//! exceeds the working width of the corresponding adder is a
//! configuration error, reported at construction rather than
//! discovered mid-execution.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Working width of the program-counter adder.
pub(crate) const PC_ADDER_BITS: u8 = 16;
/// A 16-bit pointer extended by one RAMP byte.
pub(crate) const DATA_ADDRESS_BITS: u8 = 24;
/// The acknowledge register is held in a 32-bit word.
pub(crate) const IRQ_REGISTER_BITS: u8 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfiguration {
    /// Width of the program counter in bits (word addressing).
    pub pmem_addr_bits: u8,
    /// Width of a data-memory byte address in bits.
    pub dmem_addr_bits: u8,
    /// Number of interrupt request lines.
    pub irq_lines: u8,
}

impl Default for CoreConfiguration {
    fn default() -> CoreConfiguration {
        CoreConfiguration {
            pmem_addr_bits: 14,
            dmem_addr_bits: 16,
            irq_lines: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigurationError {
    /// Program-address width exceeds the program-counter adder.
    ProgramAddressTooWide(u8),
    /// Data-address width exceeds one RAMP byte plus a 16-bit pointer.
    DataAddressTooWide(u8),
    /// An address space must be at least one bit wide.
    ZeroWidthAddress,
    /// The interrupt controller needs at least one request line.
    NoInterruptLines,
    /// More request lines than the acknowledge register can hold.
    TooManyInterruptLines(u8),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConfigurationError::ProgramAddressTooWide(bits) => write!(
                f,
                "program-address width {bits} exceeds the {PC_ADDER_BITS}-bit program counter adder"
            ),
            ConfigurationError::DataAddressTooWide(bits) => write!(
                f,
                "data-address width {bits} exceeds the {DATA_ADDRESS_BITS}-bit extended pointer"
            ),
            ConfigurationError::ZeroWidthAddress => {
                f.write_str("address widths must be at least 1 bit")
            }
            ConfigurationError::NoInterruptLines => {
                f.write_str("the interrupt controller needs at least one request line")
            }
            ConfigurationError::TooManyInterruptLines(n) => write!(
                f,
                "{n} interrupt lines will not fit the {IRQ_REGISTER_BITS}-bit acknowledge register"
            ),
        }
    }
}

impl Error for ConfigurationError {}

impl CoreConfiguration {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.pmem_addr_bits == 0 || self.dmem_addr_bits == 0 {
            return Err(ConfigurationError::ZeroWidthAddress);
        }
        if self.pmem_addr_bits > PC_ADDER_BITS {
            return Err(ConfigurationError::ProgramAddressTooWide(
                self.pmem_addr_bits,
            ));
        }
        if self.dmem_addr_bits > DATA_ADDRESS_BITS {
            return Err(ConfigurationError::DataAddressTooWide(self.dmem_addr_bits));
        }
        if self.irq_lines == 0 {
            return Err(ConfigurationError::NoInterruptLines);
        }
        if self.irq_lines > IRQ_REGISTER_BITS {
            return Err(ConfigurationError::TooManyInterruptLines(self.irq_lines));
        }
        Ok(())
    }

    /// Mask applied to every committed program-counter value.
    pub fn pc_mask(&self) -> u32 {
        mask_of(self.pmem_addr_bits)
    }

    /// Mask applied to every issued data-memory byte address.
    pub fn data_mask(&self) -> u32 {
        mask_of(self.dmem_addr_bits)
    }

    /// Mask applied to the incoming interrupt request vector.
    pub fn irq_mask(&self) -> u32 {
        mask_of(self.irq_lines)
    }
}

fn mask_of(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1_u32 << bits) - 1
    }
}
