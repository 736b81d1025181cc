//! The `base` crate defines the AVR-related things which are useful
//! in both the execution core and other associated tools.  The idea
//! is that if you want to write an assembler or a disassembler, it
//! would depend on the base crate but would not need to depend on the
//! core library itself.

mod types;

pub mod instruction;
pub mod prelude;

pub use types::{Flag, RegisterAddress, Sreg};
