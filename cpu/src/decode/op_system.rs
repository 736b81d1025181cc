//! Builders for NOP and for the instruction classes whose bodies are
//! unimplemented upstream.  The latter decode to the no-op template
//! tagged with a [`ControlRequest`] so the sequencer can log what was
//! ignored; nothing else about their semantics is modelled.
use crate::decode::ControlRequest;

use super::{Commands, DecodeContext, ResolvedOperands};

pub(super) fn nop(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    Commands::nop()
}

fn unimplemented(name: &'static str, request: ControlRequest) -> Commands {
    Commands {
        name,
        control: Some(request),
        ..Commands::nop()
    }
}

pub(super) fn sleep(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    unimplemented("sleep", ControlRequest::Sleep)
}

pub(super) fn brk(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    unimplemented("break", ControlRequest::Break)
}

pub(super) fn wdr(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    unimplemented("wdr", ControlRequest::WatchdogReset)
}

pub(super) fn ret(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    unimplemented("ret", ControlRequest::Return)
}

pub(super) fn reti(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    unimplemented("reti", ControlRequest::ReturnFromInterrupt)
}

pub(super) fn spm(_ctx: &DecodeContext, _ops: &ResolvedOperands) -> Commands {
    unimplemented("spm", ControlRequest::StoreProgramMemory)
}
