//! Binary representation of AVR instructions.
//!
//! An AVR instruction occupies one 16-bit word.  The opcode class
//! lives in the high bits, and operands are packed into the remainder
//! in several layouts.  The two-operand register form looks like this
//! (least significant bit on the right):
//!
//! |Class |r₄|d₄..d₀    |r₃..r₀ |
//! |------|--|----------|-------|
//! |6 bits|1 |5 bits    |4 bits |
//! |(15-10)|(9)|(8-4)   |(3-0)  |
//!
//! Immediate forms split their constant into disjoint nibbles around
//! the 4-bit destination field; the indexed-displacement form splits
//! its 6-bit displacement across three separate groups of bits.  The
//! accessors on [`InstructionWord`] reassemble each field; the
//! layouts follow the instruction set summary of the AVR Instruction
//! Set Manual.
//!
//! An operand field narrower than 5 bits always has fixed top bits,
//! restricting the instruction to a subset of the register file.
//! [`RegisterSelector`] enumerates the derivations so that a decode
//! rule can carry its operand addressing as data.

use std::fmt::{self, Debug, Formatter};

#[cfg(test)]
use test_strategy::Arbitrary;

use super::types::{Flag, RegisterAddress};

/// One fetched 16-bit instruction word.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InstructionWord(u16);

impl InstructionWord {
    /// The all-zero word; decodes as a no-op.
    pub const fn zero() -> InstructionWord {
        InstructionWord(0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    fn field(self, low: u8, width: u8) -> u8 {
        ((self.0 >> low) & ((1 << width) - 1)) as u8
    }

    /// Full 5-bit destination register address, bits 8-4.
    pub fn dst_full(self) -> RegisterAddress {
        RegisterAddress::new(self.field(4, 5))
    }

    /// Full 5-bit source register address, bit 9 and bits 3-0.
    pub fn src_full(self) -> RegisterAddress {
        RegisterAddress::new((self.field(9, 1) << 4) | self.field(0, 4))
    }

    /// Destination in the high half of the register file (16-31):
    /// top address bit forced to 1, bits 7-4 supply the rest.
    pub fn dst_high(self) -> RegisterAddress {
        RegisterAddress::new(0b10000 | self.field(4, 4))
    }

    /// Source in the high half of the register file (16-31).
    pub fn src_high(self) -> RegisterAddress {
        RegisterAddress::new(0b10000 | self.field(0, 4))
    }

    /// Destination in the third quarter of the register file (16-23):
    /// top two address bits forced to `10`, bits 6-4 supply the rest.
    pub fn dst_quarter(self) -> RegisterAddress {
        RegisterAddress::new(0b10000 | self.field(4, 3))
    }

    /// Source in the third quarter of the register file (16-23).
    pub fn src_quarter(self) -> RegisterAddress {
        RegisterAddress::new(0b10000 | self.field(0, 3))
    }

    /// Destination register pair: the 4-bit field addresses an
    /// aligned pair, so the low address bit is forced to 0.
    pub fn dst_pair(self) -> RegisterAddress {
        RegisterAddress::new(self.field(4, 4) << 1)
    }

    /// Source register pair.
    pub fn src_pair(self) -> RegisterAddress {
        RegisterAddress::new(self.field(0, 4) << 1)
    }

    /// Index-register pair for the word increment/decrement class:
    /// top two address bits forced to `11`, two opcode bits select
    /// the pair (24, X, Y or Z), low bit forced to 0.
    pub fn index_pair(self) -> RegisterAddress {
        RegisterAddress::new(0b11000 | (self.field(4, 2) << 1))
    }

    /// 8-bit arithmetic immediate, reassembled from bits 11-8 and 3-0.
    pub fn imm8(self) -> u8 {
        (self.field(8, 4) << 4) | self.field(0, 4)
    }

    /// 6-bit address-adder immediate, reassembled from bits 7-6 and 3-0.
    pub fn imm6(self) -> u8 {
        (self.field(6, 2) << 4) | self.field(0, 4)
    }

    /// 6-bit unsigned displacement for the Y+q / Z+q addressing
    /// forms, reassembled from bits 13, 11-10 and 2-0.
    pub fn displacement(self) -> u8 {
        (self.field(13, 1) << 5) | (self.field(10, 2) << 3) | self.field(0, 3)
    }

    /// Signed 12-bit relative-jump offset, bits 11-0 sign-extended.
    pub fn rjmp_offset(self) -> i16 {
        ((self.0 << 4) as i16) >> 4
    }

    /// Signed 7-bit relative-branch offset, bits 9-3 sign-extended.
    pub fn branch_offset(self) -> i8 {
        ((self.field(3, 7) << 1) as i8) >> 1
    }

    /// Flag selected by the conditional-branch forms, bits 2-0.
    pub fn branch_flag(self) -> Flag {
        Flag::from_index(self.field(0, 3))
    }

    /// Flag selected by the flag set/clear forms, bits 6-4.
    pub fn flag_select(self) -> Flag {
        Flag::from_index(self.field(4, 3))
    }

    /// Register or I/O bit number, bits 2-0.
    pub fn bit_select(self) -> u8 {
        self.field(0, 3)
    }

    /// 5-bit I/O address of the bit set/clear and I/O skip forms,
    /// bits 7-3.
    pub fn io5(self) -> u8 {
        self.field(3, 5)
    }

    /// 6-bit I/O address of the IN/OUT forms, reassembled from bits
    /// 10-9 and 3-0.
    pub fn io6(self) -> u8 {
        (self.field(9, 2) << 4) | self.field(0, 4)
    }
}

impl From<u16> for InstructionWord {
    fn from(bits: u16) -> InstructionWord {
        InstructionWord(bits)
    }
}

impl From<InstructionWord> for u16 {
    fn from(w: InstructionWord) -> u16 {
        w.0
    }
}

impl Debug for InstructionWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{:#06x}", self.0)
    }
}

/// The operand-address derivations.
///
/// Each instruction class uses exactly one derivation for its
/// destination and (if any) source; a decode rule stores the
/// derivation rather than re-deriving addresses per instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterSelector {
    /// Full 5-bit register address.
    Full,
    /// Aligned register pair, low address bit forced to 0.
    WordPair,
    /// Registers 16-31, top address bit forced to 1.
    HighHalf,
    /// Registers 16-23, top two address bits forced to `10`.
    ThirdQuarter,
    /// Pairs 24/26/28/30, top two address bits forced to `11`,
    /// low bit forced to 0.
    IndexPair,
}

impl RegisterSelector {
    pub fn destination(self, w: InstructionWord) -> RegisterAddress {
        match self {
            RegisterSelector::Full => w.dst_full(),
            RegisterSelector::WordPair => w.dst_pair(),
            RegisterSelector::HighHalf => w.dst_high(),
            RegisterSelector::ThirdQuarter => w.dst_quarter(),
            RegisterSelector::IndexPair => w.index_pair(),
        }
    }

    pub fn source(self, w: InstructionWord) -> RegisterAddress {
        match self {
            RegisterSelector::Full => w.src_full(),
            RegisterSelector::WordPair => w.src_pair(),
            RegisterSelector::HighHalf => w.src_high(),
            RegisterSelector::ThirdQuarter => w.src_quarter(),
            // The index-pair class has no second register operand.
            RegisterSelector::IndexPair => w.index_pair(),
        }
    }
}
