//! Builders for the indirect load/store forms and the program-memory
//! loads.  All the data-space addressing (displacement, post-increment,
//! pre-decrement, RAMP extension) is delegated to [`crate::agu`]; the
//! builders only choose the pointer and mode and route the result.
use base::prelude::*;

use crate::agu::{self, IndexMode, Pointer};
use crate::decode::{MemCommand, MemWidth, ProgramRead};

use super::{Commands, DecodeContext, ResolvedOperands};

fn load(name: &'static str, ctx: &DecodeContext, ops: &ResolvedOperands, pointer: Pointer, mode: IndexMode) -> Commands {
    let base = ctx.regs.read_word(pointer.register());
    let access = agu::resolve(pointer, mode, base, ctx.ramp.for_pointer(pointer));
    Commands {
        name,
        mem: Some(MemCommand {
            write: false,
            width: MemWidth::Byte,
            address: access.address,
            data: 0,
            dest: Some(ops.dst.address),
        }),
        pointer: access.pointer_update,
        ..Commands::nop()
    }
}

// The register field of the store forms sits in the destination
// position of the word; it supplies the byte to be written.
fn store(name: &'static str, ctx: &DecodeContext, ops: &ResolvedOperands, pointer: Pointer, mode: IndexMode) -> Commands {
    let base = ctx.regs.read_word(pointer.register());
    let access = agu::resolve(pointer, mode, base, ctx.ramp.for_pointer(pointer));
    Commands {
        name,
        mem: Some(MemCommand {
            write: true,
            width: MemWidth::Byte,
            address: access.address,
            data: ops.dst.byte.into(),
            dest: None,
        }),
        pointer: access.pointer_update,
        ..Commands::nop()
    }
}

pub(super) fn ld_x(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld x", ctx, ops, Pointer::X, IndexMode::Bare)
}

pub(super) fn ld_x_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld x+", ctx, ops, Pointer::X, IndexMode::PostIncrement)
}

pub(super) fn ld_x_dec(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld -x", ctx, ops, Pointer::X, IndexMode::PreDecrement)
}

pub(super) fn ld_y_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld y+", ctx, ops, Pointer::Y, IndexMode::PostIncrement)
}

pub(super) fn ld_y_dec(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld -y", ctx, ops, Pointer::Y, IndexMode::PreDecrement)
}

pub(super) fn ld_z_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld z+", ctx, ops, Pointer::Z, IndexMode::PostIncrement)
}

pub(super) fn ld_z_dec(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ld -z", ctx, ops, Pointer::Z, IndexMode::PreDecrement)
}

/// Displacement zero is the bare `LD Rd, Y` encoding.
pub(super) fn ldd_y(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ldd y+q", ctx, ops, Pointer::Y, IndexMode::Displaced(ctx.word.displacement()))
}

pub(super) fn ldd_z(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    load("ldd z+q", ctx, ops, Pointer::Z, IndexMode::Displaced(ctx.word.displacement()))
}

pub(super) fn st_x(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st x", ctx, ops, Pointer::X, IndexMode::Bare)
}

pub(super) fn st_x_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st x+", ctx, ops, Pointer::X, IndexMode::PostIncrement)
}

pub(super) fn st_x_dec(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st -x", ctx, ops, Pointer::X, IndexMode::PreDecrement)
}

pub(super) fn st_y_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st y+", ctx, ops, Pointer::Y, IndexMode::PostIncrement)
}

pub(super) fn st_y_dec(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st -y", ctx, ops, Pointer::Y, IndexMode::PreDecrement)
}

pub(super) fn st_z_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st z+", ctx, ops, Pointer::Z, IndexMode::PostIncrement)
}

pub(super) fn st_z_dec(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("st -z", ctx, ops, Pointer::Z, IndexMode::PreDecrement)
}

pub(super) fn std_y(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("std y+q", ctx, ops, Pointer::Y, IndexMode::Displaced(ctx.word.displacement()))
}

pub(super) fn std_z(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    store("std z+q", ctx, ops, Pointer::Z, IndexMode::Displaced(ctx.word.displacement()))
}

// Program-memory loads address code space with the raw 16-bit Z
// value; bit 0 selects the byte inside the fetched word and the RAMP
// extension does not apply.

pub(super) fn lpm_r0(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    program_load("lpm", ctx, RegisterAddress::PRODUCT, false)
}

pub(super) fn lpm(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    program_load("lpm z", ctx, ops.dst.address, false)
}

pub(super) fn lpm_inc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    program_load("lpm z+", ctx, ops.dst.address, true)
}

fn program_load(name: &'static str, ctx: &DecodeContext, dest: RegisterAddress, increment: bool) -> Commands {
    let z = ctx.regs.read_word(RegisterAddress::Z);
    let pointer_update = if increment {
        agu::resolve(Pointer::Z, IndexMode::PostIncrement, z, 0).pointer_update
    } else {
        None
    };
    Commands {
        name,
        pmem_read: Some(ProgramRead {
            byte_address: z.into(),
            dest,
            pointer_update,
        }),
        ..Commands::nop()
    }
}
