//! Error kinds for escrow operations
//!
//! A zero-owed withdrawal is deliberately *not* represented here: it is a
//! successful no-op, not a failure.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscrowError {
    /// A value send cannot be satisfied from the current balance.
    InsufficientFunds,
    /// The nested-call resource limit was reached; reported only to the
    /// frame that issued the failing send.
    BudgetExhausted,
    /// `credit` rejects non-positive amounts.
    ZeroCredit,
    /// Operation names a party the machine never registered.
    UnknownParty,
    /// Operation names an escrow the machine never deployed.
    UnknownEscrow,
    /// The fixed party bound is exhausted.
    PartyLimit,
}

impl fmt::Display for EscrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscrowError::InsufficientFunds => write!(f, "insufficient funds for send"),
            EscrowError::BudgetExhausted => write!(f, "execution budget exhausted"),
            EscrowError::ZeroCredit => write!(f, "credit amount must be positive"),
            EscrowError::UnknownParty => write!(f, "unknown party"),
            EscrowError::UnknownEscrow => write!(f, "unknown escrow"),
            EscrowError::PartyLimit => write!(f, "party limit reached"),
        }
    }
}

impl std::error::Error for EscrowError {}
