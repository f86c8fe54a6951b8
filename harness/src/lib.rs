//! Pullpay scenario harness
//!
//! The escrow model is synchronous; this crate wraps it in the collaborator
//! layer a deployed escrow would live behind: an in-process node that
//! finalizes submitted operations after a delay, receipt polling with
//! fixed-interval retry, and account funding helpers.

pub mod config;
pub mod funding;
pub mod node;
pub mod scenario;

pub use config::Config;
pub use node::{Op, OpId, Receipt, SimNode};
