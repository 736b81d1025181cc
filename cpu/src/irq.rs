//! The interrupt priority controller.
//!
//! Selects the lowest-indexed pending request line (bit 0 has the
//! highest priority) and produces a one-hot acknowledge vector.  The
//! acknowledge register is latched only on the tick the sequencer
//! actually takes an interrupt; on every other tick it resets to
//! zero.
//!
//! A one-cycle-delayed copy of the global interrupt-enable flag is
//! maintained here as an explicit register.  The core may only act on
//! a pending request when the flag and its delayed copy are both set;
//! this models the architectural guarantee that at least one
//! instruction after enabling interrupts always completes before a
//! request can be taken.
use tracing::{event, Level};

#[derive(Debug)]
pub struct InterruptController {
    line_mask: u32,
    acknowledge: u32,
    delayed_enable: bool,
}

impl InterruptController {
    pub fn new(line_mask: u32) -> InterruptController {
        InterruptController {
            line_mask,
            acknowledge: 0,
            delayed_enable: false,
        }
    }

    /// The one-hot acknowledge vector latched on the most recent
    /// tick, or zero.
    pub fn acknowledge(&self) -> u32 {
        self.acknowledge
    }

    /// Isolates the highest-priority (lowest-indexed) set bit.
    pub fn select(&self, pending: u32) -> u32 {
        let pending = pending & self.line_mask;
        pending & pending.wrapping_neg()
    }

    /// The index of the request which would be taken, if any is
    /// pending and the enable plus its delayed copy are both set.
    pub fn takeable(&self, pending: u32, interrupt_enable: bool) -> Option<u8> {
        if !(interrupt_enable && self.delayed_enable) {
            return None;
        }
        let selected = self.select(pending);
        if selected == 0 {
            None
        } else {
            Some(selected.trailing_zeros() as u8)
        }
    }

    /// Advances the controller by one committed tick.  `take` is
    /// asserted by the sequencer on the tick an interrupt is actually
    /// taken; only then is the acknowledge vector latched.
    pub fn commit(&mut self, pending: u32, interrupt_enable: bool, take: bool) {
        self.acknowledge = if take {
            let selected = self.select(pending);
            event!(
                Level::DEBUG,
                "acknowledging interrupt line {}",
                selected.trailing_zeros()
            );
            selected
        } else {
            0
        };
        self.delayed_enable = interrupt_enable;
    }

    /// Synchronous reset: acknowledge and the delayed enable copy are
    /// cleared.
    pub fn reset(&mut self) {
        self.acknowledge = 0;
        self.delayed_enable = false;
    }
}
