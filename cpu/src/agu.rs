//! The address generator.
//!
//! Resolves the effective data-memory address for the indirect and
//! indexed load/store forms.  Each pointer register is extended by a
//! high-order RAMP byte (owned here, mutated only through its
//! dedicated I/O address) to form the wide effective address.
//!
//! The pointer-update modes reuse the ALU word adder for the
//! increment/decrement, so the update commits through an ordinary
//! register-file word write; its flag side effects are suppressed by
//! an empty mask and are never committed.
use serde::Serialize;

use base::prelude::*;

use crate::alu::{self, AluOp};
use crate::regfile::RegisterWrite;

/// The three pointer registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pointer {
    X,
    Y,
    Z,
}

impl Pointer {
    pub fn register(self) -> RegisterAddress {
        match self {
            Pointer::X => RegisterAddress::X,
            Pointer::Y => RegisterAddress::Y,
            Pointer::Z => RegisterAddress::Z,
        }
    }
}

/// How the pointer participates in the access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexMode {
    /// Use the pointer unchanged.
    Bare,
    /// Add an unsigned displacement to the pointer for this access
    /// only; the pointer itself is not written back.
    Displaced(u8),
    /// Use the pointer, then write back pointer+1.
    PostIncrement,
    /// Write back pointer-1, then use the decremented value.
    PreDecrement,
}

/// The extended-address high bytes.  RAMPD extends direct addressing
/// (an unimplemented instruction class) and is held here only so that
/// its I/O address reads back what was written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RampRegisters {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub d: u8,
}

impl RampRegisters {
    pub fn for_pointer(&self, pointer: Pointer) -> u8 {
        match pointer {
            Pointer::X => self.x,
            Pointer::Y => self.y,
            Pointer::Z => self.z,
        }
    }
}

/// The effective address of one access plus the pointer write-back
/// request, if the mode has one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedAccess {
    pub address: u32,
    pub pointer_update: Option<RegisterWrite>,
}

/// Computes the effective byte address for `pointer` under `mode`.
/// `base` is the current 16-bit pointer value; `ramp` its high byte.
/// The caller masks the address to the configured data width.
pub fn resolve(pointer: Pointer, mode: IndexMode, base: u16, ramp: u8) -> ResolvedAccess {
    let extend = |pointer_value: u16| (u32::from(ramp) << 16) | u32::from(pointer_value);
    match mode {
        IndexMode::Bare => ResolvedAccess {
            address: extend(base),
            pointer_update: None,
        },
        IndexMode::Displaced(q) => ResolvedAccess {
            // The displacement adder carries into the RAMP bits.
            address: extend(base).wrapping_add(u32::from(q)),
            pointer_update: None,
        },
        IndexMode::PostIncrement => {
            let updated = alu::execute(AluOp::AddWord, base, 1, false).result;
            ResolvedAccess {
                address: extend(base),
                pointer_update: Some(RegisterWrite::word(pointer.register(), updated)),
            }
        }
        IndexMode::PreDecrement => {
            let updated = alu::execute(AluOp::SubWord, base, 1, false).result;
            ResolvedAccess {
                address: extend(updated),
                pointer_update: Some(RegisterWrite::word(pointer.register(), updated)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, IndexMode, Pointer};
    use crate::regfile::RegisterWrite;
    use base::prelude::*;

    #[test]
    fn test_bare_pointer_is_unchanged() {
        let access = resolve(Pointer::X, IndexMode::Bare, 0x1234, 0);
        assert_eq!(access.address, 0x1234);
        assert_eq!(access.pointer_update, None);
    }

    #[test]
    fn test_ramp_byte_extends_the_address() {
        let access = resolve(Pointer::Z, IndexMode::Bare, 0x1234, 0x02);
        assert_eq!(access.address, 0x02_1234);
    }

    #[test]
    fn test_displacement_is_added_for_the_access_only() {
        let access = resolve(Pointer::Y, IndexMode::Displaced(63), 0x0100, 0);
        assert_eq!(access.address, 0x013f);
        assert_eq!(access.pointer_update, None);
    }

    #[test]
    fn test_post_increment_uses_old_value() {
        let access = resolve(Pointer::X, IndexMode::PostIncrement, 0x2000, 0);
        assert_eq!(access.address, 0x2000);
        assert_eq!(
            access.pointer_update,
            Some(RegisterWrite::word(RegisterAddress::X, 0x2001))
        );
    }

    #[test]
    fn test_pre_decrement_uses_new_value() {
        let access = resolve(Pointer::Z, IndexMode::PreDecrement, 0x2000, 0);
        assert_eq!(access.address, 0x1fff);
        assert_eq!(
            access.pointer_update,
            Some(RegisterWrite::word(RegisterAddress::Z, 0x1fff))
        );
    }

    #[test]
    fn test_pointer_wraps_at_sixteen_bits() {
        let access = resolve(Pointer::X, IndexMode::PostIncrement, 0xffff, 0x01);
        assert_eq!(access.address, 0x01_ffff);
        assert_eq!(
            access.pointer_update,
            Some(RegisterWrite::word(RegisterAddress::X, 0x0000))
        );
    }
}
