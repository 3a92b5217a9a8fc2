//! `AssemblerState` (§3 "Location counter"/"One-shot banks", §4.5, §9
//! "Mutable shared state"): the mutable state threaded through the pass
//! drivers. Assembler-instance-local, never a process global, per §9.

use crate::memory::TrueAddress;

/// The assembler's mutable, per-run state. Owned by the pass driver and
/// passed by mutable reference to each card handler (§9).
#[derive(Debug, Clone, Default)]
pub struct AssemblerState {
    /// `None` until the first `SETLOC`/`BANK`/`BLOCK`; emitting a
    /// memory-producing card while `None` raises "location not set".
    pub location_counter: Option<TrueAddress>,
    /// Set after a basic `INDEX`; consumed by the very next instruction,
    /// which then skips bank-reachability validation on its operand.
    pub index_mode: bool,
    pub e_bank: u32,
    pub s_bank: u32,
    pub one_shot_e_bank: Option<u32>,
    pub one_shot_s_bank: Option<u32>,
    /// The active `COUNT` card's label, if any; cleared by the next
    /// `COUNT` (with no argument) or never, per the historical behavior of
    /// tallying from the card onward.
    pub count: Option<String>,
    /// An interpretive card awaiting its pairing partner (§4.5): the first
    /// of two source lines that pack into one word. `Store`/`STADR` cards
    /// never wait here, since they each take a whole word alone.
    pub pending_interpretive: Option<crate::card::Card>,
}

impl AssemblerState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes and returns the one-shot erasable bank, restoring the
    /// steady-state `e_bank` for subsequent cards.
    pub fn take_one_shot_e_bank(&mut self) -> Option<u32> {
        self.one_shot_e_bank.take()
    }

    pub fn take_one_shot_s_bank(&mut self) -> Option<u32> {
        self.one_shot_s_bank.take()
    }

    /// Advances the location counter by `extent` words, as every
    /// memory-producing card does after its word(s) are reserved/built.
    pub fn advance(&mut self, extent: u16) {
        if let Some(lc) = &mut self.location_counter {
            *lc += u32::from(extent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_consumed_once() {
        let mut state = AssemblerState::new();
        state.one_shot_e_bank = Some(3);
        assert_eq!(state.take_one_shot_e_bank(), Some(3));
        assert_eq!(state.take_one_shot_e_bank(), None);
    }

    #[test]
    fn advance_is_a_no_op_when_undefined() {
        let mut state = AssemblerState::new();
        state.advance(2);
        assert_eq!(state.location_counter, None);
    }
}
