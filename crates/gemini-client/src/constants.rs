//! Gemini API constants
//!
//! Endpoint layout, model identifiers, per-category timeouts, and the two
//! fixed instructional prefixes. Model identifiers are configuration, not
//! secrets; credentials never appear here, they are appended to the request
//! URL by the rotation core.

use std::time::Duration;

use tracing::warn;

/// Base URL of the Generative Language API.
pub const GENERATIVE_LANGUAGE_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured, and the fallback for unknown ids.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Model identifiers this build knows how to address.
pub const KNOWN_MODELS: &[&str] = &[
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
];

/// Timeout for the minimal credential probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for answer-extraction (Classification) requests.
pub const CLASSIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for code-generation (Generation) requests. Longer because the
/// category is routed to a slower, higher-capability model.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Instructional prefix for Classification requests.
///
/// The model sees a screenshot of one or more multiple-choice questions and
/// must reply with bare answer letters only.
pub const ANSWER_PROMPT: &str = "You are an expert test-taker. Work through every \
multiple-choice question in the image step by step, check your reasoning, then \
output ONLY the answers. Format: a single letter (A, B, C, or D) for one \
question; for several questions, <number><letter> pairs separated by spaces \
(example: 1A 2B 3C). If options are unlabeled, assign A/B/C/D top to bottom. \
No explanations, no extra words.";

/// Instructional prefix for Generation requests.
///
/// The model sees a screenshot of a programming problem and must reply with
/// bare source code.
pub const CODE_PROMPT: &str = "You are an expert competitive programmer. Read the \
coding problem in the image and produce the most efficient correct solution. \
Handle all edge cases and constraints, including empty and boundary inputs. \
Output ONLY clean, executable code with proper indentation: no markdown, no \
backticks, no commentary.";

/// Build the generateContent URL for a model, without the credential.
pub fn generate_url(base: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{model}:generateContent",
        base.trim_end_matches('/')
    )
}

/// Map a requested model id to one this build can address.
///
/// Unknown ids fall back to `DEFAULT_MODEL` so a typo in configuration
/// degrades to the stock model instead of a dead endpoint.
pub fn resolve_model(requested: &str) -> &str {
    if KNOWN_MODELS.contains(&requested) {
        requested
    } else {
        warn!(requested, fallback = DEFAULT_MODEL, "unknown model id, using fallback");
        DEFAULT_MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_has_v1beta_shape() {
        assert_eq!(
            generate_url(GENERATIVE_LANGUAGE_BASE, "gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn generate_url_tolerates_trailing_slash() {
        assert_eq!(
            generate_url("http://127.0.0.1:9999/", "gemini-2.0-flash"),
            "http://127.0.0.1:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn resolve_model_keeps_known_ids() {
        assert_eq!(resolve_model("gemini-2.5-pro"), "gemini-2.5-pro");
        assert_eq!(resolve_model("gemini-1.5-flash"), "gemini-1.5-flash");
    }

    #[test]
    fn resolve_model_falls_back_on_unknown_id() {
        assert_eq!(resolve_model("gemini-9000-ultra"), DEFAULT_MODEL);
        assert_eq!(resolve_model(""), DEFAULT_MODEL);
    }

    #[test]
    fn generation_timeout_exceeds_classification() {
        assert!(GENERATION_TIMEOUT > CLASSIFICATION_TIMEOUT);
        assert!(PROBE_TIMEOUT < CLASSIFICATION_TIMEOUT);
    }
}
