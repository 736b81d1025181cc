//! Builders for the multiply family.  All six variants feed the same
//! multiplier; the rule only fixes the signedness of each operand and
//! whether the fractional left-shift applies.  The 16-bit product
//! always lands in the fixed r1:r0 pair.
use base::prelude::*;

use crate::mult::{self, MulCommand};
use crate::regfile::RegisterWrite;

use super::{Commands, DecodeContext, ResolvedOperands};

fn multiply(
    name: &'static str,
    ops: &ResolvedOperands,
    dst_signed: bool,
    src_signed: bool,
    fractional: bool,
) -> Commands {
    let out = mult::execute(&MulCommand {
        dst_signed,
        src_signed,
        fractional,
        rd: ops.dst.byte,
        rr: ops.src.byte,
    });
    Commands {
        name,
        reg: Some(RegisterWrite::word(RegisterAddress::PRODUCT, out.product)),
        flags: out.flags,
        ..Commands::nop()
    }
}

pub(super) fn mul(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    multiply("mul", ops, false, false, false)
}

pub(super) fn muls(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    multiply("muls", ops, true, true, false)
}

pub(super) fn mulsu(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    multiply("mulsu", ops, true, false, false)
}

pub(super) fn fmul(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    multiply("fmul", ops, false, false, true)
}

pub(super) fn fmuls(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    multiply("fmuls", ops, true, true, true)
}

pub(super) fn fmulsu(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    multiply("fmulsu", ops, true, false, true)
}
