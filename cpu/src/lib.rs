//! This crate implements the execution core of an 8-bit
//! AVR-compatible processor: instruction decoding, the
//! arithmetic/logic and multiply datapaths, indirect address
//! generation, the status-flag merge rule, interrupt priority
//! selection, and the per-tick sequencer which commits state.
#![crate_name = "cpu"]

mod agu;
mod alu;
mod bus;
mod config;
mod control;
mod decode;
mod irq;
mod mult;
mod regfile;
mod sreg;

pub use agu::{IndexMode, Pointer, RampRegisters, ResolvedAccess};
pub use alu::{AluOp, AluOutput};
pub use bus::{CoreBus, DataBus, DataBusRequest, IoBus, ProgramMemory};
pub use config::{ConfigurationError, CoreConfiguration};
pub use control::{Core, CoreState};
pub use decode::{
    decode, Commands, ControlRequest, DecodeContext, IoCommand, IoReadAction, MemCommand,
    MemWidth, PcUpdate, ProgramRead,
};
pub use irq::InterruptController;
pub use mult::{MulCommand, MulOutput};
pub use regfile::{RegisterFile, RegisterWrite, WriteWidth};
pub use sreg::SregUpdate;

/// I/O-space addresses owned by the core itself.  Accesses to these
/// are satisfied internally and never reach the peripheral bus.
pub mod ioreg {
    pub const RAMPD: u8 = 0x38;
    pub const RAMPX: u8 = 0x39;
    pub const RAMPY: u8 = 0x3a;
    pub const RAMPZ: u8 = 0x3b;
    pub const SPL: u8 = 0x3d;
    pub const SPH: u8 = 0x3e;
    pub const SREG: u8 = 0x3f;
}
