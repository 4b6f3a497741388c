//! Credential pool and rotation state
//!
//! The pool owns the ordered credential list (insertion order defines
//! rotation order) and the per-credential state, all behind one mutex. The
//! lock is held only for bookkeeping, never across a network call, so
//! concurrent dispatches may observe the same or different active keys
//! depending on interleaving.
//!
//! Rotation is blind round-robin: `(current + 1) % len`, no health check, no
//! re-verification. A rotation can land on a key whose last attempt already
//! failed; the per-call attempt budget bounds the damage.

use std::sync::Mutex;

use common::Secret;
use tracing::{debug, info};

/// Environment variables scanned for credentials, in rotation order.
const KEY_ENV_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "GEMINI_API_KEY_2",
    "GEMINI_API_KEY_3",
    "GEMINI_API_KEY_4",
    "GEMINI_API_KEY_5",
];

/// Why a credential last failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFailure {
    /// Rotation-triggering HTTP status
    Status(u16),
    /// Per-call timeout elapsed
    TimedOut,
}

/// Per-credential record, one per pool entry, process-lifetime only.
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pub verified: bool,
    pub last_failure: Option<KeyFailure>,
}

/// Selection + per-key state, guarded together by a single lock.
struct RotationState {
    active: Option<usize>,
    states: Vec<KeyState>,
}

/// Ordered credential pool with blind round-robin rotation.
pub struct KeyPool {
    keys: Vec<Secret<String>>,
    state: Mutex<RotationState>,
}

impl KeyPool {
    /// Create a pool from an ordered credential list. No key starts active.
    pub fn new(keys: Vec<Secret<String>>) -> Self {
        let states = vec![KeyState::default(); keys.len()];
        Self {
            keys,
            state: Mutex::new(RotationState { active: None, states }),
        }
    }

    /// Load the pool from `GEMINI_API_KEY` (and `_2` through `_5`). Blank
    /// and unset entries are skipped; surviving order matches the variable
    /// numbering.
    pub fn from_env() -> Self {
        let mut keys = Vec::new();
        for var in KEY_ENV_VARS {
            if let Ok(value) = std::env::var(var) {
                let value = value.trim();
                if !value.is_empty() {
                    keys.push(Secret::new(value.to_string()));
                }
            }
        }
        info!(keys = keys.len(), "credential pool loaded");
        Self::new(keys)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Log-safe identifier for a credential.
    pub fn fingerprint(&self, index: usize) -> String {
        self.keys[index].fingerprint()
    }

    /// Owned copy of a credential by index. Probing addresses keys by
    /// position before any is active.
    pub fn key_value(&self, index: usize) -> String {
        self.keys[index].expose().clone()
    }

    /// Currently active index, if any.
    pub fn active_index(&self) -> Option<usize> {
        self.state.lock().expect("pool lock poisoned").active
    }

    /// Active index plus an owned copy of the credential value, for building
    /// the request URL outside the lock.
    pub fn active(&self) -> Option<(usize, String)> {
        let state = self.state.lock().expect("pool lock poisoned");
        state.active.map(|i| (i, self.keys[i].expose().clone()))
    }

    /// Activate a credential and mark it verified.
    pub fn set_active(&self, index: usize) {
        assert!(index < self.keys.len(), "active index out of bounds");
        let mut state = self.state.lock().expect("pool lock poisoned");
        state.active = Some(index);
        state.states[index].verified = true;
        state.states[index].last_failure = None;
    }

    /// Advance the active selection to `(current + 1) % len`, unconditionally.
    ///
    /// Returns the new index. No-op when the pool is empty or nothing is
    /// active yet.
    pub fn rotate_to_next(&self) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        let mut state = self.state.lock().expect("pool lock poisoned");
        let current = state.active?;
        let next = (current + 1) % self.keys.len();
        state.active = Some(next);
        debug!(from = current, to = next, "rotated to next credential");
        Some(next)
    }

    /// Record a rotation-triggering failure against a credential.
    pub fn record_failure(&self, index: usize, failure: KeyFailure) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        state.states[index].verified = false;
        state.states[index].last_failure = Some(failure);
    }

    /// Mark a credential as verified (probe answered 200).
    pub fn mark_verified(&self, index: usize) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        state.states[index].verified = true;
        state.states[index].last_failure = None;
    }

    /// Copy of the per-key states, for logging and tests.
    pub fn snapshot(&self) -> Vec<KeyState> {
        self.state.lock().expect("pool lock poisoned").states.clone()
    }
}
