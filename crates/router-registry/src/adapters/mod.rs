//! # Adapters Layer (Outer Hexagon)
//!
//! In-memory implementations of the driven ports, used by tests and by hosts
//! that keep the account in process.

pub mod memory_store;
pub mod outbox;

pub use memory_store::*;
pub use outbox::*;
