//! The 8x8 -> 16 multiplier.
//!
//! Four variants cover the signedness combinations of the operands
//! plus the fractional (Q7) forms.  The product always commits as a
//! word write to the register pair (r1:r0); that write request is
//! produced by the decode rule, not here.
use base::prelude::*;

use crate::sreg::SregUpdate;

/// Multiplier operand and mode selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MulCommand {
    /// Destination operand is signed.
    pub dst_signed: bool,
    /// Source operand is signed.
    pub src_signed: bool,
    /// Left-shift the product by one bit before truncation (Q7
    /// fractional convention).
    pub fractional: bool,
    pub rd: u8,
    pub rr: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MulOutput {
    pub product: u16,
    pub flags: SregUpdate,
}

/// The multiply class affects only carry and zero; every other flag
/// is excluded from the mask.
const MUL_MASK: u8 = Flag::C.bit() | Flag::Z.bit();

pub fn execute(command: &MulCommand) -> MulOutput {
    let lhs: i32 = if command.dst_signed {
        i32::from(command.rd as i8)
    } else {
        i32::from(command.rd)
    };
    let rhs: i32 = if command.src_signed {
        i32::from(command.rr as i8)
    } else {
        i32::from(command.rr)
    };
    let raw = lhs * rhs;
    // Carry is bit 15 of the product before the fractional shift.
    let carry = raw & 0x8000 != 0;
    let shifted = if command.fractional { raw << 1 } else { raw };
    let product = shifted as u16;
    let value = Sreg::ZERO
        .with(Flag::C, carry)
        .with(Flag::Z, product == 0);
    MulOutput {
        product,
        flags: SregUpdate::new(value, Sreg::from_bits(MUL_MASK)),
    }
}

#[cfg(test)]
mod tests {
    use super::{execute, MulCommand};
    use base::prelude::*;

    fn unsigned(rd: u8, rr: u8) -> MulCommand {
        MulCommand {
            dst_signed: false,
            src_signed: false,
            fractional: false,
            rd,
            rr,
        }
    }

    fn flags_of(output: &super::MulOutput) -> Sreg {
        output.flags.apply(Sreg::ZERO)
    }

    #[test]
    fn test_unsigned_multiply() {
        let output = execute(&unsigned(0x02, 0x03));
        assert_eq!(output.product, 0x0006);
        assert!(!flags_of(&output).get(Flag::Z));
        assert!(!flags_of(&output).get(Flag::C));
    }

    #[test]
    fn test_unsigned_multiply_sets_carry_from_bit_15() {
        let output = execute(&unsigned(0xff, 0xff));
        assert_eq!(output.product, 0xfe01);
        assert!(flags_of(&output).get(Flag::C));
    }

    #[test]
    fn test_signed_multiply() {
        let command = MulCommand {
            dst_signed: true,
            src_signed: true,
            ..unsigned(0xff, 0xff)
        };
        // (-1) x (-1) = 1; bit 15 is clear so no carry.
        let output = execute(&command);
        assert_eq!(output.product, 0x0001);
        assert!(!flags_of(&output).get(Flag::C));
        assert!(!flags_of(&output).get(Flag::Z));
    }

    #[test]
    fn test_mixed_sign_multiply() {
        let command = MulCommand {
            dst_signed: true,
            src_signed: false,
            ..unsigned(0xff, 0x02)
        };
        // (-1) x 2 = -2.
        let output = execute(&command);
        assert_eq!(output.product, 0xfffe);
        assert!(flags_of(&output).get(Flag::C));
    }

    #[test]
    fn test_fractional_multiply_shifts_once() {
        let command = MulCommand {
            fractional: true,
            ..unsigned(0x40, 0x40)
        };
        // 0.5 x 0.5 = 0.25 in Q7: 0x1000 before the shift.
        let output = execute(&command);
        assert_eq!(output.product, 0x2000);
        assert!(!flags_of(&output).get(Flag::C));
    }

    #[test]
    fn test_zero_product_sets_zero_flag() {
        let output = execute(&unsigned(0x00, 0x55));
        assert_eq!(output.product, 0);
        assert!(flags_of(&output).get(Flag::Z));
    }

    #[test]
    fn test_multiply_leaves_other_flags_alone() {
        let previous = Sreg::from_bits(0xff);
        let output = execute(&unsigned(0x02, 0x03));
        let merged = output.flags.apply(previous);
        // C and Z recomputed, everything else untouched.
        assert!(!merged.get(Flag::C));
        assert!(!merged.get(Flag::Z));
        assert!(merged.get(Flag::N));
        assert!(merged.get(Flag::I));
        assert!(merged.get(Flag::H));
    }
}
