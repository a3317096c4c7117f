//! I/O boundaries for negotiation sessions.

pub mod config;
pub mod model;
pub mod prompt;
