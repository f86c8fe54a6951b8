//! Synchronous nested-call machine
//!
//! All execution is single-threaded and strictly stack-structured: a
//! `withdraw` that sends value to a party with an armed receipt hook
//! suspends at the send, the hook runs to completion (including any
//! reentrant `withdraw` it performs), and only then does the outer frame
//! resume. Reentrancy is the only concurrency hazard modelled; it is
//! handled by the escrow's ordering discipline, not by exclusion.

use crate::budget::ExecutionBudget;
use crate::error::EscrowError;
use crate::math::*;
use crate::state::*;

/// The machine owning all scenario state: registered parties, deployed
/// escrows, and the execution budget. Each public operation is a
/// top-level entry point and gets a fresh budget.
#[derive(Clone, Debug)]
pub struct Vm {
    params: Params,
    budget: ExecutionBudget,
    parties: Vec<Party>,
    escrows: Vec<Escrow>,
}

impl Vm {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            budget: ExecutionBudget::new(params.budget_capacity),
            parties: Vec::new(),
            escrows: Vec::new(),
        }
    }

    /// Mint a fresh party identity with an empty wallet and no hook.
    pub fn register(&mut self) -> Result<PartyId, EscrowError> {
        if self.parties.len() >= MAX_PARTIES {
            return Err(EscrowError::PartyLimit);
        }
        let id = PartyId(self.parties.len() as u8);
        self.parties.push(Party {
            id,
            balance: 0,
            hook: None,
        });
        Ok(id)
    }

    /// Deploy a fresh escrow instance with the given withdraw ordering.
    pub fn deploy(&mut self, order: WithdrawOrder) -> EscrowId {
        let id = EscrowId(self.escrows.len() as u8);
        self.escrows.push(Escrow::new(order));
        id
    }

    /// Setup primitive: mint value straight into a wallet.
    pub fn fund(&mut self, party: PartyId, amount: Amount) -> Result<(), EscrowError> {
        let idx = self.party_index(party)?;
        self.parties[idx].balance = add_u128(self.parties[idx].balance, amount);
        Ok(())
    }

    /// Wallet-to-wallet transfer. A funding primitive: it does not run the
    /// recipient's receipt hook, which belongs to escrow sends only.
    pub fn transfer(
        &mut self,
        from: PartyId,
        to: PartyId,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        let from_idx = self.party_index(from)?;
        let to_idx = self.party_index(to)?;
        if self.parties[from_idx].balance < amount {
            return Err(EscrowError::InsufficientFunds);
        }
        self.parties[from_idx].balance = sub_u128(self.parties[from_idx].balance, amount);
        self.parties[to_idx].balance = add_u128(self.parties[to_idx].balance, amount);
        Ok(())
    }

    /// Credit `amount` to `recipient`, funded from `funder`'s wallet. The
    /// value moves into the escrow's pool; the ledger records the debt.
    pub fn credit(
        &mut self,
        escrow: EscrowId,
        funder: PartyId,
        recipient: PartyId,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.budget.reset();
        let funder_idx = self.party_index(funder)?;
        self.party_index(recipient)?;
        self.escrow_index(escrow)?;
        if amount == 0 {
            return Err(EscrowError::ZeroCredit);
        }
        if self.parties[funder_idx].balance < amount {
            return Err(EscrowError::InsufficientFunds);
        }

        let e = &mut self.escrows[escrow.0 as usize];
        e.ledger.credit(recipient, amount)?;
        e.balance = add_u128(e.balance, amount);
        self.parties[funder_idx].balance = sub_u128(self.parties[funder_idx].balance, amount);
        Ok(())
    }

    /// Top-level withdraw entry point: fresh budget, then one call frame.
    pub fn withdraw(&mut self, escrow: EscrowId, caller: PartyId) -> Result<(), EscrowError> {
        self.budget.reset();
        self.withdraw_frame(escrow, caller)
    }

    /// Install (or re-arm) a reentry hook on `party` targeting `escrow`.
    pub fn arm(&mut self, party: PartyId, target: EscrowId) -> Result<(), EscrowError> {
        let idx = self.party_index(party)?;
        self.escrow_index(target)?;
        let count = match self.parties[idx].hook {
            Some(h) => h.reentry_count,
            None => 0,
        };
        self.parties[idx].hook = Some(ReentryHook {
            target,
            armed: true,
            reentry_count: count,
        });
        Ok(())
    }

    /// Put the hook to sleep. The target reference and the diagnostic
    /// reentry count survive.
    pub fn disarm(&mut self, party: PartyId) -> Result<(), EscrowError> {
        let idx = self.party_index(party)?;
        if let Some(h) = self.parties[idx].hook.as_mut() {
            h.armed = false;
        }
        Ok(())
    }

    /// Adversary entry point: withdraw from the hook's target escrow. The
    /// reentry then happens inside the resulting send, not here.
    pub fn attack(&mut self, caller: PartyId) -> Result<(), EscrowError> {
        let idx = self.party_index(caller)?;
        let target = match self.parties[idx].hook {
            Some(h) => h.target,
            None => return Err(EscrowError::UnknownEscrow),
        };
        self.withdraw(target, caller)
    }

    // ── read-only views ────────────────────────────────────────────────

    /// Amount the escrow's ledger records as owed, 0 for unknown handles.
    pub fn owed_of(&self, escrow: EscrowId, party: PartyId) -> Amount {
        match self.escrows.get(escrow.0 as usize) {
            Some(e) => e.ledger.owed_of(party),
            None => 0,
        }
    }

    /// True held value of the escrow's pool.
    pub fn balance_of(&self, escrow: EscrowId) -> Amount {
        match self.escrows.get(escrow.0 as usize) {
            Some(e) => e.balance,
            None => 0,
        }
    }

    pub fn held_total_of(&self, escrow: EscrowId) -> Amount {
        match self.escrows.get(escrow.0 as usize) {
            Some(e) => e.ledger.held_total(),
            None => 0,
        }
    }

    /// The party's wallet balance (value outside any escrow).
    pub fn wallet_of(&self, party: PartyId) -> Amount {
        self.parties
            .get(party.0 as usize)
            .map(|p| p.balance)
            .unwrap_or(0)
    }

    /// How many times the party's armed hook has fired. Diagnostics only.
    pub fn reentries_of(&self, party: PartyId) -> u32 {
        self.parties
            .get(party.0 as usize)
            .and_then(|p| p.hook)
            .map(|h| h.reentry_count)
            .unwrap_or(0)
    }

    pub fn budget_remaining(&self) -> u32 {
        self.budget.remaining()
    }

    pub fn params(&self) -> Params {
        self.params
    }

    pub fn escrow(&self, escrow: EscrowId) -> Option<&Escrow> {
        self.escrows.get(escrow.0 as usize)
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn escrows(&self) -> &[Escrow] {
        &self.escrows
    }

    // ── call frames ────────────────────────────────────────────────────

    /// One `withdraw` call frame. Reentrant hooks land here again while an
    /// enclosing frame is still suspended inside `send`.
    fn withdraw_frame(&mut self, escrow: EscrowId, caller: PartyId) -> Result<(), EscrowError> {
        self.party_index(caller)?;
        let eidx = self.escrow_index(escrow)?;
        match self.escrows[eidx].order {
            WithdrawOrder::ClearFirst => {
                // Owed entry is zeroed before any value leaves the pool, so
                // a nested withdraw observes 0 and no-ops.
                let amount = self.escrows[eidx].ledger.clear(caller);
                if amount == 0 {
                    return Ok(());
                }
                // A failed send does not restore the cleared entry; the
                // credit is forfeit (one-shot, no rollback bookkeeping).
                self.send(escrow, caller, amount)?;
                self.escrows[eidx].ledger.debit_held(amount);
                Ok(())
            }
            WithdrawOrder::SendFirst => {
                // Owed entry still positive while the send (and anything it
                // triggers) runs: each reentrant frame re-reads it and pays
                // the full entitlement again.
                let amount = self.escrows[eidx].ledger.owed_of(caller);
                if amount == 0 {
                    return Ok(());
                }
                self.send(escrow, caller, amount)?;
                let e = &mut self.escrows[eidx];
                e.ledger.clear(caller);
                e.ledger.debit_held(amount);
                Ok(())
            }
        }
    }

    /// Value send primitive. Consumes budget, moves value pool -> wallet,
    /// then runs the recipient's receipt hook to completion before
    /// returning. A nested failure inside the hook stays in the hook; the
    /// send that triggered it still counts as received.
    fn send(&mut self, escrow: EscrowId, to: PartyId, amount: Amount) -> Result<(), EscrowError> {
        self.budget.consume(self.params.send_cost)?;
        let eidx = self.escrow_index(escrow)?;
        if self.escrows[eidx].balance < amount {
            return Err(EscrowError::InsufficientFunds);
        }
        self.escrows[eidx].balance = sub_u128(self.escrows[eidx].balance, amount);
        let to_idx = self.party_index(to)?;
        self.parties[to_idx].balance = add_u128(self.parties[to_idx].balance, amount);

        let reenter = match self.parties[to_idx].hook {
            Some(h) if h.armed => Some(h.target),
            _ => None,
        };
        if let Some(target) = reenter {
            if let Some(h) = self.parties[to_idx].hook.as_mut() {
                h.reentry_count = h.reentry_count.saturating_add(1);
            }
            // Hook swallows the nested error; only its own frame fails.
            let _ = self.withdraw_frame(target, to);
        }
        Ok(())
    }

    fn party_index(&self, party: PartyId) -> Result<usize, EscrowError> {
        let idx = party.0 as usize;
        if idx < self.parties.len() {
            Ok(idx)
        } else {
            Err(EscrowError::UnknownParty)
        }
    }

    fn escrow_index(&self, escrow: EscrowId) -> Result<usize, EscrowError> {
        let idx = escrow.0 as usize;
        if idx < self.escrows.len() {
            Ok(idx)
        } else {
            Err(EscrowError::UnknownEscrow)
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new(Params::default())
    }
}
