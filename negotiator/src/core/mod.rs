//! Deterministic, pure logic for the negotiation core.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod offer_policy;
pub mod salary;
pub mod snapshot;
pub mod state_machine;
pub mod transcript;
pub mod types;
