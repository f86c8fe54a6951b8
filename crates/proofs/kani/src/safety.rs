//! Kani proofs for the escrow's drain/no-drain properties

use kani::any;

use crate::adversary::adversary_step;
use crate::generators::*;
use escrow_model::helpers::{fully_backed, ledger_consistent, total_value};
use escrow_model::WithdrawOrder;

/// P1: Value conservation
/// No operation sequence creates or destroys value; drains only move it.
#[kani::proof]
#[kani::unwind(12)]
fn p1_total_value_conserved_across_adversary_sequences() {
    let order = if any::<bool>() {
        WithdrawOrder::ClearFirst
    } else {
        WithdrawOrder::SendFirst
    };
    let mut s = fresh_scenario(order, 8);

    let minted = total_value(&s.vm);

    let mut steps: u8 = any();
    steps = (steps % MAX_STEPS) + 1;
    for _ in 0..steps {
        adversary_step(&mut s);
        kani::assert(
            total_value(&s.vm) == minted,
            "P1: total value must be conserved by every operation",
        );
    }
}

/// P2: Clear-first at-rest consistency
/// After every top-level operation the ledger total equals the sum of owed
/// entries and every entry is physically backed, reentry attempts included.
#[kani::proof]
#[kani::unwind(12)]
fn p2_clear_first_stays_consistent_under_adversary() {
    let mut s = fresh_scenario(WithdrawOrder::ClearFirst, 8);

    let mut steps: u8 = any();
    steps = (steps % MAX_STEPS) + 1;
    for _ in 0..steps {
        adversary_step(&mut s);
        let escrow = match s.vm.escrow(s.escrow) {
            Some(e) => e,
            None => return,
        };
        kani::assert(
            ledger_consistent(escrow),
            "P2: held total must equal sum of owed entries at rest",
        );
        kani::assert(
            fully_backed(escrow),
            "P2: every owed entry must be backed by pool value",
        );
    }
}

/// P3: No double payment
/// A clear-first recipient with an armed reentrant hook receives exactly
/// its credited amount, once.
#[kani::proof]
#[kani::unwind(8)]
fn p3_clear_first_armed_hook_paid_exactly_once() {
    let mut s = fresh_scenario(WithdrawOrder::ClearFirst, 8);
    let attacker = s.recipients[0];
    let victim = s.recipients[1];

    let a = any_amount();
    let b = any_amount();
    let _ = s.vm.credit(s.escrow, s.funder, attacker, a);
    let _ = s.vm.credit(s.escrow, s.funder, victim, b);
    let _ = s.vm.arm(attacker, s.escrow);

    let _ = s.vm.attack(attacker);

    kani::assert(
        s.vm.wallet_of(attacker) == a,
        "P3: armed adversary must receive its entitlement exactly once",
    );
    kani::assert(
        s.vm.balance_of(s.escrow) == b,
        "P3: the victim's credit must remain in the pool",
    );
}

/// P4: Zero-owed withdrawal is a successful no-op
#[kani::proof]
#[kani::unwind(6)]
fn p4_zero_owed_withdraw_is_noop() {
    let order = if any::<bool>() {
        WithdrawOrder::ClearFirst
    } else {
        WithdrawOrder::SendFirst
    };
    let mut s = fresh_scenario(order, 8);
    let credited = s.recipients[0];
    let idle = s.recipients[1];

    let a = any_amount();
    let _ = s.vm.credit(s.escrow, s.funder, credited, a);

    let balance_before = s.vm.balance_of(s.escrow);
    let held_before = s.vm.held_total_of(s.escrow);

    let result = s.vm.withdraw(s.escrow, idle);

    kani::assert(result.is_ok(), "P4: zero-owed withdraw must succeed");
    kani::assert(
        s.vm.balance_of(s.escrow) == balance_before,
        "P4: zero-owed withdraw must not move value",
    );
    kani::assert(
        s.vm.held_total_of(s.escrow) == held_before,
        "P4: zero-owed withdraw must not touch the held total",
    );
    kani::assert(
        s.vm.wallet_of(idle) == 0,
        "P4: zero-owed withdraw must not pay anyone",
    );
}

/// P5: Send-first drain
/// With enough budget, an armed adversary credited `a` against a pool of
/// `a + b` walks away with more than `a`.
#[kani::proof]
#[kani::unwind(12)]
fn p5_send_first_overpays_armed_adversary() {
    let mut s = fresh_scenario(WithdrawOrder::SendFirst, 8);
    let attacker = s.recipients[0];
    let victim = s.recipients[1];

    let a = any_amount();
    let b = any_amount();
    // at least one extra full entitlement must be in the pool for the
    // second send to clear the balance check
    kani::assume(b >= a);
    let _ = s.vm.credit(s.escrow, s.funder, attacker, a);
    let _ = s.vm.credit(s.escrow, s.funder, victim, b);
    let _ = s.vm.arm(attacker, s.escrow);

    let _ = s.vm.attack(attacker);

    kani::assert(
        s.vm.wallet_of(attacker) > a,
        "P5: send-first must overpay the reentrant adversary",
    );
    kani::assert(
        s.vm.balance_of(s.escrow) < b,
        "P5: the drain must eat into the victim's backing",
    );
}
