//! Register addressing and the status register.
//!
//! The register file holds 32 byte-wide cells.  The top six cells
//! (addresses 26-31) are additionally viewed as three little-endian
//! 16-bit pointer registers X (27:26), Y (29:28) and Z (31:30) which
//! the load/store instructions use for indirect addressing.  Both
//! views name the same storage; there is no separate copy.
use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

/// The address of one of the 32 general-purpose registers.
///
/// Instruction words carry register addresses in 5-bit fields (or
/// narrower fields with fixed top bits, see
/// [`RegisterSelector`](crate::instruction::RegisterSelector)), so
/// every representable field value names an existing register.
/// Construction masks the value to 5 bits accordingly.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RegisterAddress(#[cfg_attr(test, strategy(0u8..32))] u8);

impl RegisterAddress {
    /// Low byte of the X pointer (r26).
    pub const X: RegisterAddress = RegisterAddress(26);
    /// Low byte of the Y pointer (r28).
    pub const Y: RegisterAddress = RegisterAddress(28);
    /// Low byte of the Z pointer (r30).
    pub const Z: RegisterAddress = RegisterAddress(30);
    /// Low byte of the multiplier's fixed destination pair (r1:r0).
    pub const PRODUCT: RegisterAddress = RegisterAddress(0);

    pub const fn new(n: u8) -> RegisterAddress {
        RegisterAddress(n & 0x1f)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The even address of the register pair containing this
    /// register.  Word accesses always operate on an aligned pair.
    pub const fn pair_base(self) -> RegisterAddress {
        RegisterAddress(self.0 & !1)
    }

    /// The other half of the pair containing this register.
    pub const fn pair_high(self) -> RegisterAddress {
        RegisterAddress((self.0 & !1) | 1)
    }
}

impl From<RegisterAddress> for u8 {
    fn from(r: RegisterAddress) -> u8 {
        r.0
    }
}

impl Display for RegisterAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "r{}", self.0)
    }
}

impl Debug for RegisterAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        Display::fmt(self, f)
    }
}

#[test]
fn test_register_address_pairing() {
    assert_eq!(RegisterAddress::new(27).pair_base(), RegisterAddress::X);
    assert_eq!(RegisterAddress::new(26).pair_high(), RegisterAddress::new(27));
    assert_eq!(RegisterAddress::new(31).pair_base(), RegisterAddress::Z);
    // Construction masks to the 5-bit field width.
    assert_eq!(RegisterAddress::new(32), RegisterAddress::new(0));
}

/// The eight condition/status flags, in bit order (C is bit 0).
///
/// S is maintained as N xor V by every flag-producing operation; the
/// status register stores it like any other bit so that a direct
/// write through the I/O port can set it independently.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Flag {
    /// Carry.
    C = 0,
    /// Zero.
    Z = 1,
    /// Negative (result bit 7).
    N = 2,
    /// Two's-complement overflow.
    V = 3,
    /// Sign, N xor V.
    S = 4,
    /// Half-carry (carry out of bit 3).
    H = 5,
    /// Transfer bit, moved to and from registers by BST/BLD.
    T = 6,
    /// Global interrupt enable.
    I = 7,
}

impl Flag {
    /// Decodes a 3-bit flag-select field from an instruction word.
    pub const fn from_index(n: u8) -> Flag {
        match n & 0b111 {
            0 => Flag::C,
            1 => Flag::Z,
            2 => Flag::N,
            3 => Flag::V,
            4 => Flag::S,
            5 => Flag::H,
            6 => Flag::T,
            _ => Flag::I,
        }
    }

    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Flag::C => "C",
            Flag::Z => "Z",
            Flag::N => "N",
            Flag::V => "V",
            Flag::S => "S",
            Flag::H => "H",
            Flag::T => "T",
            Flag::I => "I",
        })
    }
}

/// The value of the 8-bit status register.
///
/// `Sreg` is a plain value; the selective-update rule which decides
/// how an instruction's computed flags combine with the previous
/// state lives with the status unit in the core, and uses
/// [`Sreg::merged`].
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Sreg(u8);

impl Sreg {
    pub const ZERO: Sreg = Sreg(0);
    /// All eight flags set; useful as an update mask.
    pub const ALL: Sreg = Sreg(0xff);

    pub const fn from_bits(bits: u8) -> Sreg {
        Sreg(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn get(self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        if value {
            self.0 |= flag.bit();
        } else {
            self.0 &= !flag.bit();
        }
    }

    /// Returns a copy with `flag` forced to `value`.
    #[must_use]
    pub const fn with(self, flag: Flag, value: bool) -> Sreg {
        if value {
            Sreg(self.0 | flag.bit())
        } else {
            Sreg(self.0 & !flag.bit())
        }
    }

    /// The selective-update rule: flags selected by `mask` take their
    /// bit from `value`, flags outside `mask` are left untouched.
    #[must_use]
    pub const fn merged(self, value: Sreg, mask: Sreg) -> Sreg {
        Sreg((value.0 & mask.0) | (self.0 & !mask.0))
    }
}

impl From<u8> for Sreg {
    fn from(bits: u8) -> Sreg {
        Sreg(bits)
    }
}

impl From<Sreg> for u8 {
    fn from(s: Sreg) -> u8 {
        s.0
    }
}

impl Display for Sreg {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        // Most significant flag first, set flags in upper case.
        for flag in [
            Flag::I,
            Flag::T,
            Flag::H,
            Flag::S,
            Flag::V,
            Flag::N,
            Flag::Z,
            Flag::C,
        ] {
            let name = flag.to_string();
            if self.get(flag) {
                f.write_str(&name)?;
            } else {
                f.write_str(&name.to_lowercase())?;
            }
        }
        Ok(())
    }
}

impl Debug for Sreg {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Sreg({self})")
    }
}
