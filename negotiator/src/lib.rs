//! Salary-negotiation practice engine.
//!
//! A language model plays a hiring manager while this crate owns everything
//! that must stay deterministic: the offer, the negotiation status and the
//! streak counters. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (offer policy, state machine,
//!   classification parsing, salary data). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting boundaries (config files, prompt rendering,
//!   the model HTTP client). Isolated behind traits to enable scripted tests.
//!
//! [`session`] coordinates the two for each user turn.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
