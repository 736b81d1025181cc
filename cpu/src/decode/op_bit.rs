//! Builders for single-bit manipulation: transfer-bit load/store,
//! direct flag set/clear, I/O-space bit writes and the register and
//! I/O bit skips.
use base::prelude::*;

use crate::decode::{IoCommand, IoReadAction};
use crate::regfile::RegisterWrite;
use crate::sreg::SregUpdate;

use super::{Commands, DecodeContext, ResolvedOperands};

/// Copies the T flag into the selected bit of the register.
pub(super) fn bld(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let bit = ctx.word.bit_select();
    let value = if ctx.sreg.get(Flag::T) {
        ops.dst.byte | (1 << bit)
    } else {
        ops.dst.byte & !(1 << bit)
    };
    Commands {
        name: "bld",
        reg: Some(RegisterWrite::byte(ops.dst.address, value)),
        ..Commands::nop()
    }
}

/// Copies the selected register bit into the T flag.
pub(super) fn bst(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    let set = ops.dst.byte & (1 << ctx.word.bit_select()) != 0;
    Commands {
        name: "bst",
        flags: SregUpdate::single(Flag::T, set),
        ..Commands::nop()
    }
}

pub(super) fn bset(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "bset",
        flags: SregUpdate::single(ctx.word.flag_select(), true),
        ..Commands::nop()
    }
}

pub(super) fn bclr(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "bclr",
        flags: SregUpdate::single(ctx.word.flag_select(), false),
        ..Commands::nop()
    }
}

/// I/O-space bit writes hand the peripheral a one-bit mask; the
/// peripheral decides whether the bit is writable.
pub(super) fn sbi(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    let bit = ctx.word.bit_select();
    Commands {
        name: "sbi",
        io: Some(IoCommand::Write {
            address: ctx.word.io5(),
            value: 1 << bit,
            mask: 1 << bit,
        }),
        ..Commands::nop()
    }
}

pub(super) fn cbi(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    let bit = ctx.word.bit_select();
    Commands {
        name: "cbi",
        io: Some(IoCommand::Write {
            address: ctx.word.io5(),
            value: 0,
            mask: 1 << bit,
        }),
        ..Commands::nop()
    }
}

pub(super) fn sbrc(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "sbrc",
        skip_next: ops.dst.byte & (1 << ctx.word.bit_select()) == 0,
        ..Commands::nop()
    }
}

pub(super) fn sbrs(ctx: &DecodeContext, ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "sbrs",
        skip_next: ops.dst.byte & (1 << ctx.word.bit_select()) != 0,
        ..Commands::nop()
    }
}

/// The I/O skips cannot decide at decode time; the port byte arrives
/// during the bus phase, so the skip decision rides on the read
/// action.
pub(super) fn sbic(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "sbic",
        io: Some(IoCommand::Read {
            address: ctx.word.io5(),
            action: IoReadAction::SkipIfBitClear(ctx.word.bit_select()),
        }),
        ..Commands::nop()
    }
}

pub(super) fn sbis(ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    Commands {
        name: "sbis",
        io: Some(IoCommand::Read {
            address: ctx.word.io5(),
            action: IoReadAction::SkipIfBitSet(ctx.word.bit_select()),
        }),
        ..Commands::nop()
    }
}
