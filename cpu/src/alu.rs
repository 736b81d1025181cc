//! The arithmetic/logic unit.
//!
//! Operates on two byte (or, for the word-class opcodes, word)
//! operands plus a carry-in.  Every operation is a pure function from
//! operands to a result and a computed flag vector; the decoder
//! attaches the mask which decides which of those flags commit.
//!
//! The flag formulas are the AVR data-sheet equations: half-carry is
//! the carry out of bit 3 in the active operation's add/subtract
//! sense, overflow is two's-complement overflow of the byte
//! operation, and the word-class overflow/carry detect the
//! sign-changing patterns specific to the 16-bit adder.
//!
//! There is no separate shift-left: LSL and ROL are encoded as ADD
//! and ADC of a register with itself.  Shift-right covers LSR, ASR
//! and ROR; the only difference between those three is the value fed
//! as carry-in (zero, the sign bit, or the previous carry flag).
use base::prelude::*;

use crate::sreg::SregUpdate;

/// The operation modes of the ALU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    AddWord,
    SubWord,
    And,
    Or,
    Xor,
    /// Shift the destination right one bit, injecting the carry-in at
    /// bit 7.
    ShiftRight,
}

/// Result and computed flag vector of one ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluOutput {
    pub result: u16,
    pub flags: SregUpdate,
}

/// Flags affected by the byte add/subtract class.
const ARITH_MASK: u8 =
    Flag::C.bit() | Flag::Z.bit() | Flag::N.bit() | Flag::V.bit() | Flag::S.bit() | Flag::H.bit();
/// Flags affected by the logic class: carry and half-carry are
/// excluded from the mask, overflow is forced to zero.
const LOGIC_MASK: u8 = Flag::Z.bit() | Flag::N.bit() | Flag::V.bit() | Flag::S.bit();
/// Flags affected by shift-right and by the word add/subtract class.
const SHIFT_MASK: u8 =
    Flag::C.bit() | Flag::Z.bit() | Flag::N.bit() | Flag::V.bit() | Flag::S.bit();

/// Executes one ALU operation.  Byte-class operands live in the low
/// byte of `dst`/`src`; word-class operands use the full width.
pub fn execute(op: AluOp, dst: u16, src: u16, carry_in: bool) -> AluOutput {
    match op {
        AluOp::Add => add_bytes(dst as u8, src as u8, carry_in),
        AluOp::Sub => sub_bytes(dst as u8, src as u8, carry_in),
        AluOp::AddWord => add_words(dst, src),
        AluOp::SubWord => sub_words(dst, src),
        AluOp::And => logic((dst & src) as u8),
        AluOp::Or => logic((dst | src) as u8),
        AluOp::Xor => logic((dst ^ src) as u8),
        AluOp::ShiftRight => shift_right(dst as u8, carry_in),
    }
}

fn bit(value: u8, n: u8) -> bool {
    value & (1 << n) != 0
}

fn arith_flags(result: u8, z: bool, v: bool, c: bool, h: bool) -> SregUpdate {
    let n = bit(result, 7);
    let value = Sreg::ZERO
        .with(Flag::C, c)
        .with(Flag::Z, z)
        .with(Flag::N, n)
        .with(Flag::V, v)
        .with(Flag::S, n ^ v)
        .with(Flag::H, h);
    SregUpdate::new(value, Sreg::from_bits(ARITH_MASK))
}

fn add_bytes(rd: u8, rr: u8, carry_in: bool) -> AluOutput {
    let result = rd.wrapping_add(rr).wrapping_add(u8::from(carry_in));
    let (rd7, rr7, r7) = (bit(rd, 7), bit(rr, 7), bit(result, 7));
    let (rd3, rr3, r3) = (bit(rd, 3), bit(rr, 3), bit(result, 3));
    let h = (rd3 && rr3) || (rr3 && !r3) || (!r3 && rd3);
    let v = (rd7 && rr7 && !r7) || (!rd7 && !rr7 && r7);
    let c = (rd7 && rr7) || (rr7 && !r7) || (!r7 && rd7);
    AluOutput {
        result: u16::from(result),
        flags: arith_flags(result, result == 0, v, c, h),
    }
}

fn sub_bytes(rd: u8, rr: u8, carry_in: bool) -> AluOutput {
    // The flag formulas use the original operands; the result already
    // incorporates the borrow-in.
    let result = rd.wrapping_sub(rr).wrapping_sub(u8::from(carry_in));
    let (rd7, rr7, r7) = (bit(rd, 7), bit(rr, 7), bit(result, 7));
    let (rd3, rr3, r3) = (bit(rd, 3), bit(rr, 3), bit(result, 3));
    let h = (!rd3 && rr3) || (rr3 && r3) || (r3 && !rd3);
    let v = (rd7 && !rr7 && !r7) || (!rd7 && rr7 && r7);
    let c = (!rd7 && rr7) || (rr7 && r7) || (r7 && !rd7);
    AluOutput {
        result: u16::from(result),
        flags: arith_flags(result, result == 0, v, c, h),
    }
}

fn logic(result: u8) -> AluOutput {
    let n = bit(result, 7);
    let value = Sreg::ZERO
        .with(Flag::Z, result == 0)
        .with(Flag::N, n)
        .with(Flag::V, false)
        .with(Flag::S, n);
    AluOutput {
        result: u16::from(result),
        flags: SregUpdate::new(value, Sreg::from_bits(LOGIC_MASK)),
    }
}

fn shift_right(rd: u8, carry_in: bool) -> AluOutput {
    let result = (rd >> 1) | if carry_in { 0x80 } else { 0 };
    let c = bit(rd, 0);
    let n = bit(result, 7);
    // For the right shifts V is N xor C, the sign predictor one shift
    // ahead.
    let v = n ^ c;
    let value = Sreg::ZERO
        .with(Flag::C, c)
        .with(Flag::Z, result == 0)
        .with(Flag::N, n)
        .with(Flag::V, v)
        .with(Flag::S, n ^ v);
    AluOutput {
        result: u16::from(result),
        flags: SregUpdate::new(value, Sreg::from_bits(SHIFT_MASK)),
    }
}

fn word_flags(result: u16, v: bool, c: bool) -> SregUpdate {
    let n = result & 0x8000 != 0;
    let value = Sreg::ZERO
        .with(Flag::C, c)
        .with(Flag::Z, result == 0)
        .with(Flag::N, n)
        .with(Flag::V, v)
        .with(Flag::S, n ^ v);
    SregUpdate::new(value, Sreg::from_bits(SHIFT_MASK))
}

fn add_words(dst: u16, src: u16) -> AluOutput {
    let result = dst.wrapping_add(src);
    let dh7 = dst & 0x8000 != 0;
    let r15 = result & 0x8000 != 0;
    AluOutput {
        result,
        flags: word_flags(result, !dh7 && r15, !r15 && dh7),
    }
}

fn sub_words(dst: u16, src: u16) -> AluOutput {
    let result = dst.wrapping_sub(src);
    let dh7 = dst & 0x8000 != 0;
    let r15 = result & 0x8000 != 0;
    AluOutput {
        result,
        flags: word_flags(result, dh7 && !r15, r15 && !dh7),
    }
}
