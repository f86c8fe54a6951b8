//! Pure state model: parties, ledger, escrow variants

use arrayvec::ArrayVec;

use crate::error::EscrowError;
use crate::math::*;

/// Value amounts, in indivisible units.
pub type Amount = u128;

/// Fixed bound on distinct parties per machine. Keeps the ledger
/// allocation-free and the proof harnesses tractable.
pub const MAX_PARTIES: usize = 8;

/// Opaque handle for a party (funder, recipient, adversary).
/// Only [`crate::vm::Vm::register`] mints these; two handles compare equal
/// only when they denote the same party.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyId(pub(crate) u8);

/// Opaque handle for a deployed escrow instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EscrowId(pub(crate) u8);

/// Ordering of "zero the owed amount" vs. "send the value" inside
/// `withdraw`. This single choice is the whole difference between the
/// resistant and the drainable escrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawOrder {
    /// Checks-effects-interactions: clear the owed entry, then send.
    ClearFirst,
    /// Interactions before effects: send, then clear. Reentrant hooks
    /// observe the still-positive owed entry and can drain the pool.
    SendFirst,
}

/// Per-recipient owed amounts plus the pool total.
///
/// At rest (no withdrawal mid-flight) `held_total == sum of owed entries`;
/// the `SendFirst` escrow is exactly the variant that lets an adversary
/// break this once the outermost call returns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: ArrayVec<(PartyId, Amount), MAX_PARTIES>,
    held_total: Amount,
}

impl Ledger {
    /// Accumulate `amount` owed to `recipient`. Rejects zero amounts;
    /// repeated credits simply add up.
    pub fn credit(&mut self, recipient: PartyId, amount: Amount) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::ZeroCredit);
        }
        if let Some(entry) = self.entries.iter_mut().find(|(id, _)| *id == recipient) {
            entry.1 = add_u128(entry.1, amount);
        } else if self.entries.try_push((recipient, amount)).is_err() {
            return Err(EscrowError::PartyLimit);
        }
        self.held_total = add_u128(self.held_total, amount);
        Ok(())
    }

    /// Amount owed to `recipient`, 0 for identities never credited.
    pub fn owed_of(&self, recipient: PartyId) -> Amount {
        self.entries
            .iter()
            .find(|(id, _)| *id == recipient)
            .map(|(_, owed)| *owed)
            .unwrap_or(0)
    }

    /// Atomically read and zero the owed entry, returning the prior value.
    /// Does not touch `held_total`; the withdraw path debits that only
    /// after a successful send.
    pub fn clear(&mut self, recipient: PartyId) -> Amount {
        match self.entries.iter_mut().find(|(id, _)| *id == recipient) {
            Some(entry) => {
                let prior = entry.1;
                entry.1 = 0;
                prior
            }
            None => 0,
        }
    }

    pub fn held_total(&self) -> Amount {
        self.held_total
    }

    /// Sum of all owed entries. Equals `held_total` at rest unless a drain
    /// or a forfeited send has happened.
    pub fn sum_owed(&self) -> Amount {
        self.entries.iter().fold(0u128, |acc, (_, owed)| add_u128(acc, *owed))
    }

    pub(crate) fn debit_held(&mut self, amount: Amount) {
        self.held_total = sub_u128(self.held_total, amount);
    }

    pub fn entries(&self) -> &[(PartyId, Amount)] {
        &self.entries
    }
}

/// One escrow instance: an ordering discipline, its ledger, and the value
/// it physically holds. Created fresh per scenario, mutated only through
/// the machine's `credit` and `withdraw`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Escrow {
    pub order: WithdrawOrder,
    pub ledger: Ledger,
    pub balance: Amount,
}

impl Escrow {
    pub fn new(order: WithdrawOrder) -> Self {
        Self {
            order,
            ledger: Ledger::default(),
            balance: 0,
        }
    }
}

/// Receipt hook state for a reentrant party. When `armed`, a value send to
/// the owning party re-invokes `withdraw` on `target` before the send
/// returns; the nested call's error is swallowed by the hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReentryHook {
    /// Non-owning reference to the escrow under attack.
    pub target: EscrowId,
    pub armed: bool,
    /// Number of times the armed hook fired. Diagnostics only.
    pub reentry_count: u32,
}

/// A party: a wallet balance plus an optional receipt hook. Plain
/// recipients have no hook; the adversary is a party whose hook re-enters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Party {
    pub id: PartyId,
    pub balance: Amount,
    pub hook: Option<ReentryHook>,
}

/// Machine parameters, fixed per scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    /// Execution budget granted to each top-level operation.
    pub budget_capacity: u32,
    /// Budget units consumed by each value send.
    pub send_cost: u32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            budget_capacity: 64,
            send_cost: 1,
        }
    }
}
