//! End-to-end scenarios driven through the simulated node.
//!
//! The tests live in `tests/`; this crate body only hosts shared setup.

use std::time::Duration;

use escrow_model::{EscrowId, Params, PartyId, Vm, WithdrawOrder};
use pullpay_harness::SimNode;

pub const POLL: Duration = Duration::from_millis(1);

pub struct Setup {
    pub node: SimNode,
    pub escrow: EscrowId,
    pub funder: PartyId,
    pub attacker: PartyId,
    pub victim: PartyId,
}

/// Node with a funded funder, an (unarmed) attacker slot, and a victim.
pub fn setup(order: WithdrawOrder, budget_capacity: u32, stake: u128) -> Setup {
    let mut vm = Vm::new(Params {
        budget_capacity,
        send_cost: 1,
    });
    let funder = vm.register().expect("party bound");
    let attacker = vm.register().expect("party bound");
    let victim = vm.register().expect("party bound");
    let escrow = vm.deploy(order);
    vm.fund(funder, stake).expect("funder registered");
    Setup {
        node: SimNode::new(vm, 2),
        escrow,
        funder,
        attacker,
        victim,
    }
}
