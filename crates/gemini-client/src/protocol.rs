//! Gemini generateContent envelope types
//!
//! Request: `{contents:[{parts:[{text},{inline_data:{mime_type,data}}]}]}`.
//! Response: `{candidates:[{content:{parts:[{text}]}}]}`. Response parsing is
//! lenient about extra fields (finishReason, usageMetadata, safety ratings)
//! and strict about the `candidates` field itself: a 200 body without it does
//! not deserialize.

use serde::{Deserialize, Serialize};

/// Request body for generateContent.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

/// One content block of a request.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// Request content part: either text or inline image data.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

/// Base64-encoded inline media.
#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Success envelope of a generateContent call.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
}

/// One generation candidate.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: CandidateContent,
}

/// Content of a candidate.
#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// Response part. Only text parts are consumed; other part kinds
/// deserialize with `text: None` and are skipped.
#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// First text part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}
