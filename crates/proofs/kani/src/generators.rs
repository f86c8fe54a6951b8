//! Generators for bounded scenarios (for Kani)

#[cfg(kani)]
use kani::any;

use escrow_model::{EscrowId, Params, PartyId, Vm, WithdrawOrder};

// Small bounds keep the nested-call exploration tractable
pub const N_RECIPIENTS: usize = 2;
pub const MAX_AMOUNT: u128 = 100;
pub const MAX_STEPS: u8 = 4;
pub const FUNDER_STAKE: u128 = 10_000;

/// A deployed scenario: funder, recipients, one escrow.
pub struct Scenario {
    pub vm: Vm,
    pub escrow: EscrowId,
    pub funder: PartyId,
    pub recipients: [PartyId; N_RECIPIENTS],
}

/// Fresh machine with a funded funder and `N_RECIPIENTS` empty wallets.
/// After the one-off mint here, every operation only moves value around.
pub fn fresh_scenario(order: WithdrawOrder, budget_capacity: u32) -> Scenario {
    let mut vm = Vm::new(Params {
        budget_capacity,
        send_cost: 1,
    });
    // register cannot fail: 1 + N_RECIPIENTS is far below the party bound
    let funder = vm.register().unwrap_or(PartyId::default());
    let a = vm.register().unwrap_or(funder);
    let b = vm.register().unwrap_or(funder);
    let escrow = vm.deploy(order);
    let _ = vm.fund(funder, FUNDER_STAKE);
    Scenario {
        vm,
        escrow,
        funder,
        recipients: [a, b],
    }
}

#[cfg(kani)]
pub fn any_amount() -> u128 {
    let raw: u8 = any();
    ((raw as u128) % MAX_AMOUNT).max(1)
}

#[cfg(kani)]
pub fn any_recipient(s: &Scenario) -> PartyId {
    let raw: u8 = any();
    s.recipients[(raw as usize) % N_RECIPIENTS]
}
