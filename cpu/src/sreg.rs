//! The status-flags unit.
//!
//! Every instruction supplies a computed flag vector and a mask; the
//! committed flags are `(computed & mask) | (previous & !mask)`.
//! Flags outside the mask are left untouched, not undefined: where
//! the architecture leaves a flag unconstrained (several multiply
//! flags, for example) the flag is simply excluded from the mask and
//! the computed bit is a stable placeholder of zero.
//!
//! The one write path which bypasses the merge is a direct I/O write
//! to the flag-register address; the sequencer performs that as a
//! full overwrite (see [`crate::ioreg::SREG`]).
use base::prelude::*;

/// An instruction's flag outcome: the computed vector plus the mask
/// of flags the operation is allowed to modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SregUpdate {
    pub value: Sreg,
    pub mask: Sreg,
}

impl SregUpdate {
    /// Leaves every flag untouched.
    pub const NONE: SregUpdate = SregUpdate {
        value: Sreg::ZERO,
        mask: Sreg::ZERO,
    };

    pub const fn new(value: Sreg, mask: Sreg) -> SregUpdate {
        SregUpdate { value, mask }
    }

    /// Sets or clears a single flag.
    pub const fn single(flag: Flag, set: bool) -> SregUpdate {
        SregUpdate {
            value: Sreg::ZERO.with(flag, set),
            mask: Sreg::ZERO.with(flag, true),
        }
    }

    /// Restricts this update to the flags in `mask`.
    #[must_use]
    pub const fn masked_by(self, mask: Sreg) -> SregUpdate {
        SregUpdate {
            value: self.value,
            mask: Sreg::from_bits(self.mask.bits() & mask.bits()),
        }
    }

    /// Returns a copy with `flag` forced to `set` and included in the
    /// mask.
    #[must_use]
    pub const fn with(self, flag: Flag, set: bool) -> SregUpdate {
        SregUpdate {
            value: self.value.with(flag, set),
            mask: self.mask.with(flag, true),
        }
    }

    /// The pure merge function.
    #[must_use]
    pub fn apply(&self, previous: Sreg) -> Sreg {
        previous.merged(self.value, self.mask)
    }
}
