//! Error types for negotiation sessions.

use thiserror::Error;

/// Failures surfaced by [`crate::session::Negotiator`].
///
/// None of these is fatal: each aborts a single call and leaves the session
/// as it was before the call.
#[derive(Error, Debug)]
pub enum NegotiationError {
    /// Initialization input was missing or invalid. Nothing was changed.
    #[error("invalid session configuration: {0}")]
    Configuration(String),

    /// A turn was submitted before any session was initialized.
    #[error("chat not initialized; initialize a session first")]
    NotInitialized,

    /// The model could not be reached or answered with an error.
    #[error("model transport error: {0}")]
    ModelTransport(#[from] ModelError),
}

impl NegotiationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Failures calling the language model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be read or parsed.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// The response contained no choices.
    #[error("response contained no choices")]
    EmptyResponse,

    /// The client is missing required configuration (e.g. an API key).
    #[error("client not configured: {0}")]
    NotConfigured(String),
}
