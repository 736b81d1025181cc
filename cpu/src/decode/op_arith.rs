//! Builders for the ALU instruction classes: two-register and
//! immediate add/subtract/compare, the logic group, the one-register
//! group, the shift-right family and the word-immediate ADIW/SBIW.
use base::prelude::*;

use crate::alu::{self, AluOp, AluOutput};
use crate::regfile::RegisterWrite;
use crate::sreg::SregUpdate;

use super::{Commands, DecodeContext, ResolvedOperands};

/// Flags committed by INC and DEC: the carry chain is deliberately
/// left alone so they can maintain loop counters inside multi-byte
/// arithmetic.
const COUNT_MASK: u8 = Flag::Z.bit() | Flag::N.bit() | Flag::V.bit() | Flag::S.bit();

fn byte_result(name: &'static str, out: AluOutput, dest: Option<RegisterAddress>) -> Commands {
    Commands {
        name,
        reg: dest.map(|address| RegisterWrite::byte(address, out.result as u8)),
        flags: out.flags,
        ..Commands::nop()
    }
}

/// Compare-with-carry and subtract-with-carry only clear Z, never
/// set it, so a multi-byte compare ends with Z describing the whole
/// value.
fn sticky_zero(flags: SregUpdate, previous: Sreg) -> SregUpdate {
    flags.with(Flag::Z, flags.value.get(Flag::Z) && previous.get(Flag::Z))
}

pub(super) fn add(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Add, ops.dst.byte.into(), ops.src.byte.into(), false);
    byte_result("add", out, Some(ops.dst.address))
}

pub(super) fn adc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let carry = ctx.sreg.get(Flag::C);
    let out = alu::execute(AluOp::Add, ops.dst.byte.into(), ops.src.byte.into(), carry);
    byte_result("adc", out, Some(ops.dst.address))
}

pub(super) fn sub(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ops.src.byte.into(), false);
    byte_result("sub", out, Some(ops.dst.address))
}

pub(super) fn sbc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let carry = ctx.sreg.get(Flag::C);
    let mut out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ops.src.byte.into(), carry);
    out.flags = sticky_zero(out.flags, ctx.sreg);
    byte_result("sbc", out, Some(ops.dst.address))
}

pub(super) fn cp(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ops.src.byte.into(), false);
    byte_result("cp", out, None)
}

pub(super) fn cpc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let carry = ctx.sreg.get(Flag::C);
    let mut out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ops.src.byte.into(), carry);
    out.flags = sticky_zero(out.flags, ctx.sreg);
    byte_result("cpc", out, None)
}

pub(super) fn subi(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ctx.word.imm8().into(), false);
    byte_result("subi", out, Some(ops.dst.address))
}

pub(super) fn sbci(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let carry = ctx.sreg.get(Flag::C);
    let mut out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ctx.word.imm8().into(), carry);
    out.flags = sticky_zero(out.flags, ctx.sreg);
    byte_result("sbci", out, Some(ops.dst.address))
}

pub(super) fn cpi(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Sub, ops.dst.byte.into(), ctx.word.imm8().into(), false);
    byte_result("cpi", out, None)
}

pub(super) fn and(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::And, ops.dst.byte.into(), ops.src.byte.into(), false);
    byte_result("and", out, Some(ops.dst.address))
}

pub(super) fn andi(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::And, ops.dst.byte.into(), ctx.word.imm8().into(), false);
    byte_result("andi", out, Some(ops.dst.address))
}

pub(super) fn or(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Or, ops.dst.byte.into(), ops.src.byte.into(), false);
    byte_result("or", out, Some(ops.dst.address))
}

pub(super) fn ori(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Or, ops.dst.byte.into(), ctx.word.imm8().into(), false);
    byte_result("ori", out, Some(ops.dst.address))
}

pub(super) fn eor(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Xor, ops.dst.byte.into(), ops.src.byte.into(), false);
    byte_result("eor", out, Some(ops.dst.address))
}

/// One's complement: XOR with all-ones, with carry forced set.
pub(super) fn com(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let mut out = alu::execute(AluOp::Xor, ops.dst.byte.into(), 0xff, false);
    out.flags = out.flags.with(Flag::C, true);
    byte_result("com", out, Some(ops.dst.address))
}

/// Two's complement: a subtraction from zero.
pub(super) fn neg(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::Sub, 0, ops.dst.byte.into(), false);
    byte_result("neg", out, Some(ops.dst.address))
}

pub(super) fn inc(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let mut out = alu::execute(AluOp::Add, ops.dst.byte.into(), 1, false);
    out.flags = out.flags.masked_by(Sreg::from_bits(COUNT_MASK));
    byte_result("inc", out, Some(ops.dst.address))
}

pub(super) fn dec(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let mut out = alu::execute(AluOp::Sub, ops.dst.byte.into(), 1, false);
    out.flags = out.flags.masked_by(Sreg::from_bits(COUNT_MASK));
    byte_result("dec", out, Some(ops.dst.address))
}

pub(super) fn lsr(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::ShiftRight, ops.dst.byte.into(), 0, false);
    byte_result("lsr", out, Some(ops.dst.address))
}

/// Arithmetic shift: the carry-in is the operand's own sign bit.
pub(super) fn asr(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let sign = ops.dst.byte & 0x80 != 0;
    let out = alu::execute(AluOp::ShiftRight, ops.dst.byte.into(), 0, sign);
    byte_result("asr", out, Some(ops.dst.address))
}

/// Rotate through carry: the carry-in is the previous carry flag.
pub(super) fn ror(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let carry = ctx.sreg.get(Flag::C);
    let out = alu::execute(AluOp::ShiftRight, ops.dst.byte.into(), 0, carry);
    byte_result("ror", out, Some(ops.dst.address))
}

/// Nibble swap touches no flags at all.
pub(super) fn swap(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let value = ops.dst.byte.rotate_left(4);
    Commands {
        name: "swap",
        reg: Some(RegisterWrite::byte(ops.dst.address, value)),
        ..Commands::nop()
    }
}

pub(super) fn adiw(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::AddWord, ops.dst.word, ctx.word.imm6().into(), false);
    Commands {
        name: "adiw",
        reg: Some(RegisterWrite::word(ops.dst.address, out.result)),
        flags: out.flags,
        ..Commands::nop()
    }
}

pub(super) fn sbiw(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let out = alu::execute(AluOp::SubWord, ops.dst.word, ctx.word.imm6().into(), false);
    Commands {
        name: "sbiw",
        reg: Some(RegisterWrite::word(ops.dst.address, out.result)),
        flags: out.flags,
        ..Commands::nop()
    }
}
