//! The three scenario groups of the reference suite, run end-to-end
//! through the simulated node for both escrow variants.

use escrow_model::{EscrowError, WithdrawOrder};
use pullpay_harness::funding::{ensure_has_at_least, ensure_unlocked};
use pullpay_harness::Op;
use pullpay_integration_tests::{setup, Setup, POLL};

async fn credit_both(s: &Setup, attacker_amount: u128, victim_amount: u128) {
    let ids = [
        s.node.submit(Op::Credit {
            escrow: s.escrow,
            funder: s.funder,
            recipient: s.attacker,
            amount: attacker_amount,
        }),
        s.node.submit(Op::Credit {
            escrow: s.escrow,
            funder: s.funder,
            recipient: s.victim,
            amount: victim_amount,
        }),
    ];
    for receipt in s.node.wait_for_receipts(&ids, POLL).await {
        assert!(receipt.succeeded(), "credit should finalize cleanly");
    }
    assert_eq!(
        s.node.with_vm(|vm| vm.balance_of(s.escrow)),
        attacker_amount + victim_amount,
        "pool should have received both credits"
    );
}

#[tokio::test]
async fn simple_refunds_in_both_withdrawal_orders() {
    for order in [WithdrawOrder::ClearFirst, WithdrawOrder::SendFirst] {
        for owner_goes_first in [true, false] {
            let s = setup(order, 64, 3000);
            ensure_unlocked(&s.node, &[s.funder, s.attacker, s.victim]).unwrap();
            credit_both(&s, 1000, 2000).await;

            let (first, second) = if owner_goes_first {
                (s.attacker, s.victim)
            } else {
                (s.victim, s.attacker)
            };

            let id = s.node.submit(Op::Withdraw {
                escrow: s.escrow,
                caller: first,
            });
            assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());
            let expected_left = if owner_goes_first { 2000 } else { 1000 };
            assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), expected_left);

            let id = s.node.submit(Op::Withdraw {
                escrow: s.escrow,
                caller: second,
            });
            assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());
            assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 0);
            assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.attacker)), 1000);
            assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.victim)), 2000);
        }
    }
}

#[tokio::test]
async fn attacker_moving_last_finds_only_its_own_credit() {
    for order in [WithdrawOrder::ClearFirst, WithdrawOrder::SendFirst] {
        let s = setup(order, 64, 3000);
        s.node
            .with_vm(|vm| vm.arm(s.attacker, s.escrow))
            .unwrap();
        credit_both(&s, 1000, 2000).await;

        let id = s.node.submit(Op::Withdraw {
            escrow: s.escrow,
            caller: s.victim,
        });
        assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());
        assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 1000);

        let id = s.node.submit(Op::Attack { caller: s.attacker });
        assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());

        // both variants end empty: there was nothing left to drain
        assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 0);
        assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.victim)), 2000);
        assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.attacker)), 1000);
    }
}

#[tokio::test]
async fn clear_first_resists_attacker_moving_first() {
    let s = setup(WithdrawOrder::ClearFirst, 200, 201);
    s.node
        .with_vm(|vm| vm.arm(s.attacker, s.escrow))
        .unwrap();
    credit_both(&s, 1, 200).await;

    let id = s.node.submit(Op::Attack { caller: s.attacker });
    assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());

    // the nested withdraw saw owed == 0: one correct payment, no drain
    assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.attacker)), 1);
    assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 200);
    assert_eq!(s.node.with_vm(|vm| vm.reentries_of(s.attacker)), 1);

    let id = s.node.submit(Op::Withdraw {
        escrow: s.escrow,
        caller: s.victim,
    });
    assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());
    assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 0);
    assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.victim)), 200);
}

#[tokio::test]
async fn send_first_drains_to_the_budget_boundary() {
    // attacker credited 1 against a pool of 201, budget of 200 sends
    let s = setup(WithdrawOrder::SendFirst, 200, 201);
    s.node
        .with_vm(|vm| vm.arm(s.attacker, s.escrow))
        .unwrap();
    credit_both(&s, 1, 200).await;

    let id = s.node.submit(Op::Attack { caller: s.attacker });
    let receipt = s.node.wait_for_receipt(id, POLL).await;

    // the budget death happens in the deepest frame; the top level is clean
    assert!(receipt.succeeded(), "no BudgetExhausted at the top level");
    assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 1);
    assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.attacker)), 200);

    // the victim's entry survived on paper only
    assert_eq!(s.node.with_vm(|vm| vm.owed_of(s.escrow, s.victim)), 200);
    let id = s.node.submit(Op::Withdraw {
        escrow: s.escrow,
        caller: s.victim,
    });
    let receipt = s.node.wait_for_receipt(id, POLL).await;
    assert_eq!(receipt.result, Err(EscrowError::InsufficientFunds));
}

#[tokio::test]
async fn zero_owed_withdraw_finalizes_as_successful_noop() {
    for order in [WithdrawOrder::ClearFirst, WithdrawOrder::SendFirst] {
        let s = setup(order, 64, 1000);
        credit_both(&s, 400, 600).await;

        // a party with nothing owed withdraws: success, no movement
        let id = s.node.submit(Op::Withdraw {
            escrow: s.escrow,
            caller: s.funder,
        });
        assert!(s.node.wait_for_receipt(id, POLL).await.succeeded());
        assert_eq!(s.node.with_vm(|vm| vm.balance_of(s.escrow)), 1000);
        assert_eq!(s.node.with_vm(|vm| vm.held_total_of(s.escrow)), 1000);
    }
}

#[tokio::test]
async fn funding_helpers_top_up_from_the_rich_account() {
    let s = setup(WithdrawOrder::ClearFirst, 64, 5000);
    ensure_unlocked(&s.node, &[s.funder, s.attacker, s.victim]).unwrap();
    ensure_has_at_least(&s.node, s.funder, &[s.attacker, s.victim], 250, POLL)
        .await
        .unwrap();

    assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.attacker)), 250);
    assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.victim)), 250);
    assert_eq!(s.node.with_vm(|vm| vm.wallet_of(s.funder)), 4500);
}

#[tokio::test]
async fn full_scenario_suite_passes() {
    let cfg = pullpay_harness::Config::default_local();
    pullpay_harness::scenario::run_all(&cfg).await.unwrap();
}
