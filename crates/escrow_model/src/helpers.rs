//! Invariant checking helpers

use crate::math::*;
use crate::state::*;
use crate::vm::Vm;

/// At-rest ledger consistency: the pool total equals the sum of owed
/// entries. May be transiently false while a withdraw is mid-flight; the
/// `SendFirst` drain leaves it false permanently.
pub fn ledger_consistent(escrow: &Escrow) -> bool {
    escrow.ledger.held_total() == escrow.ledger.sum_owed()
}

/// Every owed entry is physically backed by pool value.
pub fn fully_backed(escrow: &Escrow) -> bool {
    escrow.balance >= escrow.ledger.sum_owed()
}

/// Total value in the machine: wallets plus escrow pools. Every operation
/// moves value, none creates or destroys it, so this is constant apart
/// from explicit `fund` minting.
pub fn total_value(vm: &Vm) -> Amount {
    let wallets = vm
        .parties()
        .iter()
        .fold(0u128, |acc, p| add_u128(acc, p.balance));
    vm.escrows()
        .iter()
        .fold(wallets, |acc, e| add_u128(acc, e.balance))
}
