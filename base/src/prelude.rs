pub use crate::instruction::{InstructionWord, RegisterSelector};
pub use crate::types::{Flag, RegisterAddress, Sreg};
