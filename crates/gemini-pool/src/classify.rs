//! Status classification for failover decisions
//!
//! Distinguishes statuses that indicate the current credential is temporarily
//! unusable (quota, rate limit, overload, key rejection) from everything
//! else. Only the former trigger rotation; any other status ends the call.

/// What the dispatch loop does with a non-200 status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Advance to the next credential and retry the same call
    RotateAndRetry,
    /// Abort the call and surface the status to the caller
    Fatal,
}

/// Statuses that rotate: 400/403 (key rejected or restricted), 429 (rate or
/// quota limit), 503 (overloaded).
pub fn classify_status(status: u16) -> Disposition {
    match status {
        400 | 403 | 429 | 503 => Disposition::RotateAndRetry,
        _ => Disposition::Fatal,
    }
}
