//! The general-purpose register file.
//!
//! 32 byte-wide cells held as one flat array.  The word accessors
//! compute their addressing from the byte array rather than keeping a
//! second representation, so a byte write through a pointer alias is
//! visible immediately to word reads and vice versa.
use std::fmt::{self, Debug, Formatter};

use base::prelude::*;

/// Byte or word width of a register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteWidth {
    Byte,
    Word,
}

/// A request to write the register file, produced by the decoder and
/// committed by the sequencer.  At most one write request per
/// datapath per cycle is issued; the decoder never produces two
/// requests for the same register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    pub width: WriteWidth,
    pub address: RegisterAddress,
    pub value: u16,
}

impl RegisterWrite {
    pub fn byte(address: RegisterAddress, value: u8) -> RegisterWrite {
        RegisterWrite {
            width: WriteWidth::Byte,
            address,
            value: u16::from(value),
        }
    }

    /// A word write always targets the aligned pair containing
    /// `address` and updates both bytes atomically.
    pub fn word(address: RegisterAddress, value: u16) -> RegisterWrite {
        RegisterWrite {
            width: WriteWidth::Word,
            address: address.pair_base(),
            value,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    cells: [u8; 32],
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile { cells: [0; 32] }
    }

    pub fn read_byte(&self, address: RegisterAddress) -> u8 {
        self.cells[address.index()]
    }

    /// Reads the little-endian pair containing `address`; the low
    /// address bit is forced to zero.
    pub fn read_word(&self, address: RegisterAddress) -> u16 {
        let base = address.pair_base();
        u16::from_le_bytes([
            self.cells[base.index()],
            self.cells[base.pair_high().index()],
        ])
    }

    /// Copies out all 32 cells, for state dumps.
    pub fn snapshot(&self) -> [u8; 32] {
        self.cells
    }

    pub fn apply(&mut self, write: &RegisterWrite) {
        match write.width {
            WriteWidth::Byte => {
                self.cells[write.address.index()] = write.value as u8;
            }
            WriteWidth::Word => {
                let base = write.address.pair_base();
                let bytes = write.value.to_le_bytes();
                self.cells[base.index()] = bytes[0];
                self.cells[base.pair_high().index()] = bytes[1];
            }
        }
    }
}

impl Default for RegisterFile {
    fn default() -> RegisterFile {
        RegisterFile::new()
    }
}

impl Debug for RegisterFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for (i, value) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "r{i}={value:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterFile, RegisterWrite};
    use base::prelude::*;

    #[test]
    fn test_byte_write_is_visible_to_word_read() {
        let mut regs = RegisterFile::new();
        regs.apply(&RegisterWrite::byte(RegisterAddress::new(26), 0x34));
        regs.apply(&RegisterWrite::byte(RegisterAddress::new(27), 0x12));
        assert_eq!(regs.read_word(RegisterAddress::X), 0x1234);
    }

    #[test]
    fn test_word_write_is_visible_to_byte_reads() {
        let mut regs = RegisterFile::new();
        regs.apply(&RegisterWrite::word(RegisterAddress::X, 0xbeef));
        assert_eq!(regs.read_byte(RegisterAddress::new(26)), 0xef);
        assert_eq!(regs.read_byte(RegisterAddress::new(27)), 0xbe);
    }

    #[test]
    fn test_word_access_is_pair_aligned() {
        let mut regs = RegisterFile::new();
        // A word write through an odd address targets the pair.
        regs.apply(&RegisterWrite::word(RegisterAddress::new(31), 0xa55a));
        assert_eq!(regs.read_word(RegisterAddress::Z), 0xa55a);
        assert_eq!(regs.read_word(RegisterAddress::new(31)), 0xa55a);
    }
}
