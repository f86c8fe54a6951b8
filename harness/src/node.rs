//! In-process node simulation
//!
//! Operations are submitted, sit pending for a fixed number of ticks, then
//! execute atomically against the machine in submission order. Failed
//! operations still finalize and get a receipt carrying the error; callers
//! learn outcomes only by polling for receipts, the way they would against
//! a real network.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use escrow_model::{Amount, EscrowError, EscrowId, PartyId, Vm};
use tokio::time;

/// Handle to a submitted operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpId(u64);

/// Operations a party can submit for execution.
#[derive(Clone, Copy, Debug)]
pub enum Op {
    Credit {
        escrow: EscrowId,
        funder: PartyId,
        recipient: PartyId,
        amount: Amount,
    },
    Withdraw {
        escrow: EscrowId,
        caller: PartyId,
    },
    Attack {
        caller: PartyId,
    },
    Transfer {
        from: PartyId,
        to: PartyId,
        amount: Amount,
    },
}

/// Finalized outcome of an operation.
#[derive(Clone, Copy, Debug)]
pub struct Receipt {
    pub op: OpId,
    pub result: Result<(), EscrowError>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

struct Inner {
    vm: Vm,
    next_op: u64,
    confirm_delay_ticks: u32,
    pending: VecDeque<(OpId, Op, u32)>,
    receipts: HashMap<OpId, Receipt>,
}

/// The simulated node: one machine, a pending queue, a receipt store.
pub struct SimNode {
    inner: Mutex<Inner>,
}

impl SimNode {
    pub fn new(vm: Vm, confirm_delay_ticks: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                vm,
                next_op: 0,
                confirm_delay_ticks,
                pending: VecDeque::new(),
                receipts: HashMap::new(),
            }),
        }
    }

    /// Enqueue an operation. Nothing executes until enough ticks pass.
    pub fn submit(&self, op: Op) -> OpId {
        let mut inner = self.lock();
        let id = OpId(inner.next_op);
        inner.next_op += 1;
        let delay = inner.confirm_delay_ticks;
        inner.pending.push_back((id, op, delay));
        log::debug!("submitted {:?} as {:?}", op, id);
        id
    }

    /// Advance one tick: age the queue and execute everything that is due,
    /// in submission order.
    pub fn tick(&self) {
        let mut inner = self.lock();
        for entry in inner.pending.iter_mut() {
            entry.2 = entry.2.saturating_sub(1);
        }
        while matches!(inner.pending.front(), Some((_, _, 0))) {
            if let Some((id, op, _)) = inner.pending.pop_front() {
                let result = Self::execute(&mut inner.vm, op);
                if let Err(err) = result {
                    log::debug!("{:?} finalized with error: {}", id, err);
                }
                inner.receipts.insert(id, Receipt { op: id, result });
            }
        }
    }

    /// Receipt for a finalized operation, `None` while it is pending.
    pub fn receipt(&self, id: OpId) -> Option<Receipt> {
        self.lock().receipts.get(&id).copied()
    }

    /// Poll for a receipt at a fixed interval until it appears. Each poll
    /// advances the node one tick, so a submitted operation always
    /// finalizes eventually.
    pub async fn wait_for_receipt(&self, id: OpId, interval: Duration) -> Receipt {
        loop {
            if let Some(receipt) = self.receipt(id) {
                return receipt;
            }
            time::sleep(interval).await;
            self.tick();
        }
    }

    /// Await many operations, preserving order.
    pub async fn wait_for_receipts(&self, ids: &[OpId], interval: Duration) -> Vec<Receipt> {
        let mut receipts = Vec::with_capacity(ids.len());
        for &id in ids {
            receipts.push(self.wait_for_receipt(id, interval).await);
        }
        receipts
    }

    /// Direct machine access for setup and read-only assertions. Scenario
    /// state changes go through `submit`; this is for registration,
    /// deployment, arming, and balance queries.
    pub fn with_vm<R>(&self, f: impl FnOnce(&mut Vm) -> R) -> R {
        f(&mut self.lock().vm)
    }

    fn execute(vm: &mut Vm, op: Op) -> Result<(), EscrowError> {
        match op {
            Op::Credit {
                escrow,
                funder,
                recipient,
                amount,
            } => vm.credit(escrow, funder, recipient, amount),
            Op::Withdraw { escrow, caller } => vm.withdraw(escrow, caller),
            Op::Attack { caller } => vm.attack(caller),
            Op::Transfer { from, to, amount } => vm.transfer(from, to, amount),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
