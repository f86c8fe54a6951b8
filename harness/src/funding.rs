//! Account setup helpers: unlock checks and wallet top-ups

use std::time::Duration;

use escrow_model::{Amount, EscrowError, PartyId};
use thiserror::Error;

use crate::node::{Op, SimNode};

#[derive(Debug, Error)]
pub enum FundingError {
    #[error("party {0:?} is not registered with the machine")]
    Locked(PartyId),
    #[error("top-up transfer for {0:?} was rejected: {1}")]
    TransferRejected(PartyId, EscrowError),
}

/// Fail early when a scenario names a party the machine does not know.
pub fn ensure_unlocked(node: &SimNode, parties: &[PartyId]) -> Result<(), FundingError> {
    for &party in parties {
        let known = node.with_vm(|vm| vm.parties().iter().any(|p| p.id == party));
        if !known {
            return Err(FundingError::Locked(party));
        }
    }
    Ok(())
}

/// Top up every wallet below `floor` from `rich`, waiting for each
/// transfer to finalize before moving on.
pub async fn ensure_has_at_least(
    node: &SimNode,
    rich: PartyId,
    recipients: &[PartyId],
    floor: Amount,
    interval: Duration,
) -> Result<(), FundingError> {
    for &recipient in recipients {
        let balance = node.with_vm(|vm| vm.wallet_of(recipient));
        if balance >= floor {
            continue;
        }
        let id = node.submit(Op::Transfer {
            from: rich,
            to: recipient,
            amount: floor - balance,
        });
        let receipt = node.wait_for_receipt(id, interval).await;
        if let Err(err) = receipt.result {
            return Err(FundingError::TransferRejected(recipient, err));
        }
        log::debug!("topped up {:?} to {}", recipient, floor);
    }
    Ok(())
}
