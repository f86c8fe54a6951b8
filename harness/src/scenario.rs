//! Reference scenarios, one per scenario group in the original suite:
//! simple refunds, attacker-goes-last, attacker-goes-first.

use std::time::Duration;

use anyhow::{ensure, Result};
use escrow_model::{EscrowError, EscrowId, Params, PartyId, Vm, WithdrawOrder};

use crate::config::Config;
use crate::funding::{ensure_has_at_least, ensure_unlocked};
use crate::node::{Op, SimNode};

pub fn order_name(order: WithdrawOrder) -> &'static str {
    match order {
        WithdrawOrder::ClearFirst => "clear-first",
        WithdrawOrder::SendFirst => "send-first",
    }
}

struct Deployment {
    node: SimNode,
    escrow: EscrowId,
    funder: PartyId,
    first: PartyId,
    second: PartyId,
    interval: Duration,
}

/// Fresh node with a funded funder, two recipients, one escrow.
fn deploy(cfg: &Config, order: WithdrawOrder, budget_capacity: u32) -> Result<Deployment> {
    let mut vm = Vm::new(Params {
        budget_capacity,
        send_cost: cfg.send_cost,
    });
    let funder = vm.register()?;
    let first = vm.register()?;
    let second = vm.register()?;
    let escrow = vm.deploy(order);
    vm.fund(funder, cfg.owner_credit + cfg.victim_credit + cfg.attacker_credit + cfg.boundary_victim_credit)?;

    let node = SimNode::new(vm, cfg.confirm_delay_ticks);
    ensure_unlocked(&node, &[funder, first, second])?;
    Ok(Deployment {
        node,
        escrow,
        funder,
        first,
        second,
        interval: Duration::from_millis(cfg.poll_interval_ms),
    })
}

async fn credit_both(
    d: &Deployment,
    first_amount: u128,
    second_amount: u128,
) -> Result<()> {
    let ids = [
        d.node.submit(Op::Credit {
            escrow: d.escrow,
            funder: d.funder,
            recipient: d.first,
            amount: first_amount,
        }),
        d.node.submit(Op::Credit {
            escrow: d.escrow,
            funder: d.funder,
            recipient: d.second,
            amount: second_amount,
        }),
    ];
    for receipt in d.node.wait_for_receipts(&ids, d.interval).await {
        ensure!(receipt.succeeded(), "credit failed: {:?}", receipt.result);
    }
    ensure!(
        d.node.with_vm(|vm| vm.balance_of(d.escrow)) == first_amount + second_amount,
        "pool should hold both credits"
    );
    Ok(())
}

/// Owner and victim credited, withdrawn in both orders: whoever goes first,
/// each ends with exactly their credit and the pool empties.
pub async fn simple_refunds(cfg: &Config, order: WithdrawOrder) -> Result<()> {
    for owner_first in [true, false] {
        let d = deploy(cfg, order, cfg.budget_capacity)?;
        ensure_has_at_least(&d.node, d.funder, &[d.first, d.second], 1, d.interval).await?;
        credit_both(&d, cfg.owner_credit, cfg.victim_credit).await?;

        let (a, b) = if owner_first {
            (d.first, d.second)
        } else {
            (d.second, d.first)
        };
        for caller in [a, b] {
            let id = d.node.submit(Op::Withdraw {
                escrow: d.escrow,
                caller,
            });
            let receipt = d.node.wait_for_receipt(id, d.interval).await;
            ensure!(receipt.succeeded(), "withdraw failed: {:?}", receipt.result);
        }

        ensure!(
            d.node.with_vm(|vm| vm.balance_of(d.escrow)) == 0,
            "pool should be empty after both withdrawals"
        );
        ensure!(
            d.node.with_vm(|vm| vm.wallet_of(d.first)) == cfg.owner_credit + 1,
            "owner should end with exactly their credit"
        );
        ensure!(
            d.node.with_vm(|vm| vm.wallet_of(d.second)) == cfg.victim_credit + 1,
            "victim should end with exactly their credit"
        );
    }
    log::info!("[{}] simple refunds: ok", order_name(order));
    Ok(())
}

/// Victim withdraws before the armed attacker moves: nothing but the
/// attacker's own credit is left to take, so both variants end at zero.
pub async fn attacker_last(cfg: &Config, order: WithdrawOrder) -> Result<()> {
    let d = deploy(cfg, order, cfg.budget_capacity)?;
    d.node.with_vm(|vm| vm.arm(d.first, d.escrow))?;
    credit_both(&d, cfg.owner_credit, cfg.victim_credit).await?;

    let id = d.node.submit(Op::Withdraw {
        escrow: d.escrow,
        caller: d.second,
    });
    let receipt = d.node.wait_for_receipt(id, d.interval).await;
    ensure!(receipt.succeeded(), "victim withdraw failed");
    ensure!(
        d.node.with_vm(|vm| vm.balance_of(d.escrow)) == cfg.owner_credit,
        "only the attacker's credit should remain"
    );

    let id = d.node.submit(Op::Attack { caller: d.first });
    let receipt = d.node.wait_for_receipt(id, d.interval).await;
    ensure!(receipt.succeeded(), "attack failed: {:?}", receipt.result);
    ensure!(
        d.node.with_vm(|vm| vm.balance_of(d.escrow)) == 0,
        "pool should be empty after the attack"
    );
    log::info!("[{}] attacker last: ok", order_name(order));
    Ok(())
}

/// The attacker moves first against a still-full pool. Clear-first
/// degenerates the attack to one correct payment; send-first is drained of
/// everything but the attacker's own first entitlement, bounded by budget.
pub async fn attacker_first(cfg: &Config, order: WithdrawOrder) -> Result<()> {
    let d = deploy(cfg, order, cfg.attack_budget)?;
    d.node.with_vm(|vm| vm.arm(d.first, d.escrow))?;
    credit_both(&d, cfg.attacker_credit, cfg.boundary_victim_credit).await?;

    let id = d.node.submit(Op::Attack { caller: d.first });
    let receipt = d.node.wait_for_receipt(id, d.interval).await;
    ensure!(
        receipt.succeeded(),
        "no error may surface at the top level: {:?}",
        receipt.result
    );

    let balance = d.node.with_vm(|vm| vm.balance_of(d.escrow));
    let victim_withdraw = d.node.submit(Op::Withdraw {
        escrow: d.escrow,
        caller: d.second,
    });
    let victim_receipt = d.node.wait_for_receipt(victim_withdraw, d.interval).await;

    match order {
        WithdrawOrder::ClearFirst => {
            ensure!(
                balance == cfg.boundary_victim_credit,
                "resisted attack should leave the victim's credit intact"
            );
            ensure!(victim_receipt.succeeded(), "victim should withdraw cleanly");
            ensure!(
                d.node.with_vm(|vm| vm.balance_of(d.escrow)) == 0,
                "pool should empty once the victim withdraws"
            );
        }
        WithdrawOrder::SendFirst => {
            ensure!(
                balance == cfg.attacker_credit,
                "drain should leave only the attacker's first payment behind"
            );
            ensure!(
                d.node.with_vm(|vm| vm.wallet_of(d.first)) > cfg.attacker_credit,
                "attacker should have been overpaid"
            );
            ensure!(
                victim_receipt.result == Err(EscrowError::InsufficientFunds),
                "victim's entitlement should no longer be backed"
            );
        }
    }
    log::info!(
        "[{}] attacker first: ok ({} reentries)",
        order_name(order),
        d.node.with_vm(|vm| vm.reentries_of(d.first))
    );
    Ok(())
}

/// Run every scenario group for both escrow variants.
pub async fn run_all(cfg: &Config) -> Result<()> {
    for order in [WithdrawOrder::ClearFirst, WithdrawOrder::SendFirst] {
        simple_refunds(cfg, order).await?;
        attacker_last(cfg, order).await?;
        attacker_first(cfg, order).await?;
    }
    Ok(())
}
