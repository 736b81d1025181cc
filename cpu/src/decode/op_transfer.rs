//! Builders for the plain data moves: register and register-pair
//! copies, load-immediate, I/O port transfer and the single-register
//! stack push/pop.
//!
//! The stack convention here is pre-decrement on push and
//! post-increment on pop: the stack pointer always names the most
//! recently pushed byte.
use crate::decode::{IoCommand, IoReadAction, MemCommand, MemWidth};
use crate::regfile::RegisterWrite;

use super::{Commands, DecodeContext, ResolvedOperands};

pub(super) fn mov(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "mov",
        reg: Some(RegisterWrite::byte(ops.dst.address, ops.src.byte)),
        ..Commands::nop()
    }
}

pub(super) fn movw(_ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "movw",
        reg: Some(RegisterWrite::word(ops.dst.address, ops.src.word)),
        ..Commands::nop()
    }
}

pub(super) fn ldi(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "ldi",
        reg: Some(RegisterWrite::byte(ops.dst.address, ctx.word.imm8())),
        ..Commands::nop()
    }
}

pub(super) fn in_port(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "in",
        io: Some(IoCommand::Read {
            address: ctx.word.io6(),
            action: IoReadAction::Store(ops.dst.address),
        }),
        ..Commands::nop()
    }
}

// The register field of OUT sits in the destination position of the
// word even though it is the value source.
pub(super) fn out_port(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "out",
        io: Some(IoCommand::Write {
            address: ctx.word.io6(),
            value: ops.dst.byte,
            mask: 0xff,
        }),
        ..Commands::nop()
    }
}

pub(super) fn push(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "push",
        mem: Some(MemCommand {
            write: true,
            width: MemWidth::Byte,
            address: u32::from(ctx.sp.wrapping_sub(1)),
            data: ops.dst.byte.into(),
            dest: None,
        }),
        sp_delta: -1,
        ..Commands::nop()
    }
}

pub(super) fn pop(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "pop",
        mem: Some(MemCommand {
            write: false,
            width: MemWidth::Byte,
            address: ctx.sp.into(),
            data: 0,
            dest: Some(ops.dst.address),
        }),
        sp_delta: 1,
        ..Commands::nop()
    }
}
