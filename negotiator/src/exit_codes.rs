//! Stable exit codes for negotiator CLI commands.

/// Command succeeded, or a chat session ended normally.
pub const OK: i32 = 0;
/// Invalid arguments, configuration or session inputs, or an unknown job title.
pub const INVALID: i32 = 1;
/// The language model could not be reached or answered with an error.
pub const TRANSPORT: i32 = 2;
