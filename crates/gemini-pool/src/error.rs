//! Error taxonomy for dispatch
//!
//! Every variant is terminal for a single dispatch call; the caller presents
//! the message and does not re-invoke. Display strings double as the status
//! text shown to the user, so they stay short.

/// Errors from a dispatch call.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no working credentials available")]
    NoCredentialsAvailable,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("all credentials exhausted after {attempts} attempts")]
    AllCredentialsExhausted { attempts: usize },
}

/// Result alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
