//! Transport failure types

/// Failures below the HTTP layer. Non-2xx replies are not failures here;
/// they come back as `HttpReply` values for the caller to classify.
#[derive(Debug, thiserror::Error)]
pub enum TransportFailure {
    #[error("request timed out")]
    TimedOut,

    #[error("network error: {0}")]
    Network(String),
}
