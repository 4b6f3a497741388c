//! Rotation client: credential selection, probing, and the dispatch loop
//!
//! `dispatch` is the single entry point for callers. It lazily selects a
//! working credential, issues the call, and on rotation-triggering errors
//! fails over to the next key, retrying until the per-call budget (one
//! attempt per pool entry) is spent. Every failure kind is terminal for the
//! call; there is no cross-call retry or backoff.

use std::sync::Arc;

use gemini_client::constants::PROBE_TIMEOUT;
use gemini_client::{
    GenerateRequest, GenerateResponse, RequestCategory, Transport, TransportFailure,
    generate_url, probe_payload,
};
use tracing::{debug, info, warn};

use crate::classify::{Disposition, classify_status};
use crate::error::{DispatchError, Result};
use crate::pool::{KeyFailure, KeyPool};

/// Model ids bound to the two request categories.
#[derive(Debug, Clone)]
pub struct CategoryModels {
    pub classification: String,
    pub generation: String,
}

impl CategoryModels {
    pub fn model_for(&self, category: RequestCategory) -> &str {
        match category {
            RequestCategory::Classification => &self.classification,
            RequestCategory::Generation => &self.generation,
        }
    }
}

impl Default for CategoryModels {
    fn default() -> Self {
        Self {
            classification: gemini_client::DEFAULT_MODEL.to_string(),
            generation: gemini_client::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Why a probe did not verify a credential. Never propagated: logged and
/// collapsed to `false` by `verify_key`.
#[derive(Debug)]
enum ProbeFailure {
    Status(u16),
    Transport(TransportFailure),
}

impl std::fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeFailure::Status(status) => write!(f, "status {status}"),
            ProbeFailure::Transport(e) => write!(f, "{e}"),
        }
    }
}

/// Client that owns the credential pool and fails over between keys.
pub struct RotationClient {
    pool: KeyPool,
    transport: Arc<dyn Transport>,
    base_url: String,
    models: CategoryModels,
}

impl RotationClient {
    pub fn new(pool: KeyPool, transport: Arc<dyn Transport>, models: CategoryModels) -> Self {
        Self {
            pool,
            transport,
            base_url: gemini_client::GENERATIVE_LANGUAGE_BASE.to_string(),
            models,
        }
    }

    /// Point the client at a different API base (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn pool(&self) -> &KeyPool {
        &self.pool
    }

    /// Probe one credential with a minimal request against the
    /// Classification model. Only HTTP 200 verifies.
    async fn probe(&self, index: usize) -> std::result::Result<(), ProbeFailure> {
        let key = self.pool.key_value(index);
        let url = format!(
            "{}?key={key}",
            generate_url(&self.base_url, self.models.model_for(RequestCategory::Classification))
        );
        let reply = self
            .transport
            .execute(&url, &probe_payload(), PROBE_TIMEOUT)
            .await
            .map_err(ProbeFailure::Transport)?;
        if reply.status == 200 {
            Ok(())
        } else {
            Err(ProbeFailure::Status(reply.status))
        }
    }

    /// Probe a credential, swallowing every failure into `false`.
    pub async fn verify_key(&self, index: usize) -> bool {
        match self.probe(index).await {
            Ok(()) => {
                self.pool.mark_verified(index);
                true
            }
            Err(e) => {
                debug!(index, key = %self.pool.fingerprint(index), error = %e, "probe failed");
                false
            }
        }
    }

    /// Select the first credential that verifies, in pool order. No-op when
    /// a credential is already active.
    pub async fn ensure_active(&self) -> Result<()> {
        if self.pool.is_empty() {
            return Err(DispatchError::NoCredentialsAvailable);
        }
        if self.pool.active_index().is_some() {
            return Ok(());
        }

        info!(keys = self.pool.len(), "probing credential pool");
        for index in 0..self.pool.len() {
            if self.verify_key(index).await {
                self.pool.set_active(index);
                info!(index, key = %self.pool.fingerprint(index), "active credential selected");
                return Ok(());
            }
        }

        warn!("no credential passed verification");
        Err(DispatchError::NoCredentialsAvailable)
    }

    /// Issue a generateContent call, rotating through the pool on transient
    /// errors. Returns the first candidate's text on success.
    pub async fn dispatch(
        &self,
        payload: &GenerateRequest,
        category: RequestCategory,
    ) -> Result<String> {
        self.ensure_active().await?;

        let model = self.models.model_for(category);
        let endpoint = generate_url(&self.base_url, model);
        let timeout = category.timeout();
        let budget = self.pool.len();

        for attempt in 1..=budget {
            let (index, key) = self
                .pool
                .active()
                .ok_or(DispatchError::NoCredentialsAvailable)?;
            debug!(
                category = category.label(),
                model,
                attempt,
                index,
                key = %self.pool.fingerprint(index),
                "dispatching request"
            );

            let url = format!("{endpoint}?key={key}");
            match self.transport.execute(&url, payload, timeout).await {
                Ok(reply) if reply.status == 200 => {
                    let parsed: GenerateResponse = serde_json::from_str(&reply.body)
                        .map_err(|e| DispatchError::MalformedResponse(e.to_string()))?;
                    let text = parsed.first_text().ok_or_else(|| {
                        DispatchError::MalformedResponse("no text candidate".into())
                    })?;
                    info!(
                        category = category.label(),
                        attempt,
                        index,
                        chars = text.len(),
                        "request succeeded"
                    );
                    return Ok(text.to_string());
                }
                Ok(reply) => match classify_status(reply.status) {
                    Disposition::RotateAndRetry => {
                        warn!(
                            status = reply.status,
                            index,
                            key = %self.pool.fingerprint(index),
                            "credential error, rotating"
                        );
                        self.pool.record_failure(index, KeyFailure::Status(reply.status));
                        self.pool.rotate_to_next();
                    }
                    Disposition::Fatal => {
                        warn!(status = reply.status, "unexpected status, aborting call");
                        return Err(DispatchError::UnexpectedStatus {
                            status: reply.status,
                            body: reply.body,
                        });
                    }
                },
                Err(TransportFailure::TimedOut) => {
                    warn!(
                        index,
                        key = %self.pool.fingerprint(index),
                        timeout_secs = timeout.as_secs(),
                        "request timed out, rotating"
                    );
                    self.pool.record_failure(index, KeyFailure::TimedOut);
                    self.pool.rotate_to_next();
                }
                Err(TransportFailure::Network(message)) => {
                    warn!(error = %message, "transport error, aborting call");
                    return Err(DispatchError::Transport(message));
                }
            }
        }

        warn!(attempts = budget, "credential pool exhausted");
        Err(DispatchError::AllCredentialsExhausted { attempts: budget })
    }
}
