//! Payload construction
//!
//! Pairs a captured frame with the fixed instructional prefix of its request
//! category. The prompt is always the first part so the model reads the
//! instructions before the image.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::constants::{ANSWER_PROMPT, CLASSIFICATION_TIMEOUT, CODE_PROMPT, GENERATION_TIMEOUT};
use crate::protocol::{Content, GenerateRequest, InlineData, Part};

/// The two request purposes, each bound to a distinct downstream model,
/// prompt, and timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCategory {
    /// Answer extraction from multiple-choice questions
    Classification,
    /// Source-code generation for programming problems
    Generation,
}

impl RequestCategory {
    /// Fixed instructional prefix sent ahead of the image.
    pub fn prompt(self) -> &'static str {
        match self {
            RequestCategory::Classification => ANSWER_PROMPT,
            RequestCategory::Generation => CODE_PROMPT,
        }
    }

    /// Per-call timeout for this category.
    pub fn timeout(self) -> Duration {
        match self {
            RequestCategory::Classification => CLASSIFICATION_TIMEOUT,
            RequestCategory::Generation => GENERATION_TIMEOUT,
        }
    }

    /// Label for logging and status lines.
    pub fn label(self) -> &'static str {
        match self {
            RequestCategory::Classification => "classification",
            RequestCategory::Generation => "generation",
        }
    }
}

/// Build the request body for a PNG frame and a category.
pub fn build_payload(image_png: &[u8], category: RequestCategory) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text {
                    text: category.prompt().to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: "image/png".to_string(),
                        data: BASE64.encode(image_png),
                    },
                },
            ],
        }],
    }
}

/// Minimal text-only body for credential probing. Kept tiny so failed probes
/// cost as little quota as possible.
pub fn probe_payload() -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part::Text {
                text: "ping".to_string(),
            }],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_prompt_then_image() {
        let request = build_payload(b"png-bytes", RequestCategory::Classification);
        let json = serde_json::to_value(&request).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], ANSWER_PROMPT);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    }

    #[test]
    fn payload_base64_round_trips() {
        let image = b"\x89PNG\r\n\x1a\nfake-frame";
        let request = build_payload(image, RequestCategory::Generation);
        let json = serde_json::to_value(&request).unwrap();

        let encoded = json["contents"][0]["parts"][1]["inline_data"]["data"]
            .as_str()
            .unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), image);
    }

    #[test]
    fn generation_payload_uses_code_prompt() {
        let request = build_payload(b"x", RequestCategory::Generation);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], CODE_PROMPT);
    }

    #[test]
    fn probe_payload_is_single_text_part() {
        let json = serde_json::to_value(probe_payload()).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "ping");
    }

    #[test]
    fn category_timeouts_differ() {
        assert!(
            RequestCategory::Generation.timeout() > RequestCategory::Classification.timeout()
        );
    }

    #[test]
    fn category_labels() {
        assert_eq!(RequestCategory::Classification.label(), "classification");
        assert_eq!(RequestCategory::Generation.label(), "generation");
    }
}
