//! Bounded per-call execution resource, the gas-limit analogue
//!
//! Every value send (and with it every nested call a send can trigger)
//! consumes budget. Exhaustion fails the triggering send with
//! [`EscrowError::BudgetExhausted`]; the failure is reported to that send's
//! immediate frame only and never aborts the frames enclosing it.

use crate::error::EscrowError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionBudget {
    capacity: u32,
    remaining: u32,
}

impl ExecutionBudget {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            remaining: capacity,
        }
    }

    /// Refill to full capacity. Called at every top-level entry point.
    pub fn reset(&mut self) {
        self.remaining = self.capacity;
    }

    /// Consume `cost` units, failing without side effect when the remaining
    /// capacity would go negative.
    pub fn consume(&mut self, cost: u32) -> Result<(), EscrowError> {
        if cost > self.remaining {
            return Err(EscrowError::BudgetExhausted);
        }
        self.remaining -= cost;
        Ok(())
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
