//! Builders for control transfer: the relative and Z-indirect
//! jump/call forms, the flag-conditional branches and the
//! compare-skip.
//!
//! Skips never change the program counter.  They request that the
//! next fetched word be nullified, which the sequencer applies one
//! tick later.  A call pushes the word address of the following
//! instruction, low byte at the lower stack address.
use base::prelude::*;

use crate::decode::{MemCommand, MemWidth, PcUpdate};

use super::{Commands, DecodeContext, ResolvedOperands};

fn relative_target(ctx: &DecodeContext, offset: i16) -> u32 {
    ctx.pc.wrapping_add(1).wrapping_add(i32::from(offset) as u32)
}

fn call(name: &'static str, ctx: &DecodeContext, target: u32) -> Commands {
    let return_pc = ctx.pc.wrapping_add(1) as u16;
    Commands {
        name,
        pc: PcUpdate::Jump(target),
        mem: Some(MemCommand {
            write: true,
            width: MemWidth::Word,
            address: u32::from(ctx.sp.wrapping_sub(2)),
            data: return_pc,
            dest: None,
        }),
        sp_delta: -2,
        ..Commands::nop()
    }
}

pub(super) fn rjmp(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "rjmp",
        pc: PcUpdate::Jump(relative_target(ctx, ctx.word.rjmp_offset())),
        ..Commands::nop()
    }
}

pub(super) fn rcall(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    call("rcall", ctx, relative_target(ctx, ctx.word.rjmp_offset()))
}

pub(super) fn ijmp(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    let z = ctx.regs.read_word(RegisterAddress::Z);
    Commands {
        name: "ijmp",
        pc: PcUpdate::Jump(z.into()),
        ..Commands::nop()
    }
}

pub(super) fn icall(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    let z = ctx.regs.read_word(RegisterAddress::Z);
    call("icall", ctx, z.into())
}

fn branch(name: &'static str, ctx: &DecodeContext, wanted: bool) -> Commands {
    let taken = ctx.sreg.get(ctx.word.branch_flag()) == wanted;
    Commands {
        name,
        pc: if taken {
            PcUpdate::Jump(relative_target(ctx, ctx.word.branch_offset().into()))
        } else {
            PcUpdate::Advance
        },
        ..Commands::nop()
    }
}

pub(super) fn brbs(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    branch("brbs", ctx, true)
}

pub(super) fn brbc(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    branch("brbc", ctx, false)
}

pub(super) fn cpse(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "cpse",
        skip_next: ops.dst.byte == ops.src.byte,
        ..Commands::nop()
    }
}
