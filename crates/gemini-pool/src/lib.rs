//! Credential rotation core for Gemini requests
//!
//! Owns a prioritized pool of API credentials and fails over between them on
//! quota, rate-limit, and overload errors. State is process-lifetime only;
//! nothing persists between runs.
//!
//! Credential lifecycle:
//! 1. Pool loaded from `GEMINI_API_KEY` (and `_2` through `_5`) at startup,
//!    no key active
//! 2. First dispatch (or startup warmup) probes keys in order and activates
//!    the first one that answers 200
//! 3. Upstream returns 400/403/429/503 or times out → blind rotation to
//!    `(index + 1) % len`, same call retries with the next key
//! 4. Attempt budget (one per pool entry) spent → `AllCredentialsExhausted`
//! 5. Every dispatch starts its budget fresh; there is no cross-call backoff

pub mod classify;
pub mod client;
pub mod error;
pub mod pool;

pub use classify::{Disposition, classify_status};
pub use client::{CategoryModels, RotationClient};
pub use error::{DispatchError, Result};
pub use pool::{KeyFailure, KeyPool, KeyState};
