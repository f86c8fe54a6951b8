//! Pure Rust model of a pull-payment escrow and its reentrancy surface
//! No I/O dependencies, no unwrap/panic in library code, all functions total

pub mod budget;
pub mod error;
pub mod helpers;
pub mod math;
pub mod state;
pub mod vm;

// Re-export commonly used types
pub use budget::*;
pub use error::*;
pub use state::*;
pub use vm::*;
