//! Gemini generateContent wire layer
//!
//! Typed request/response envelopes, payload construction, and the HTTP
//! transport seam for the Gemini `generateContent` REST API. This crate is a
//! standalone library with no dependency on the rotation core or the binary;
//! it can be tested and used independently.
//!
//! Request flow:
//! 1. Caller captures a screen frame as PNG bytes
//! 2. `payload::build_payload()` pairs the image with the category's fixed
//!    instructional prefix
//! 3. The rotation core appends a credential and POSTs via `Transport`
//! 4. `GenerateResponse::first_text()` extracts the answer from the envelope

pub mod constants;
pub mod error;
pub mod payload;
pub mod protocol;
pub mod transport;

pub use constants::{DEFAULT_MODEL, GENERATIVE_LANGUAGE_BASE, generate_url, resolve_model};
pub use error::TransportFailure;
pub use payload::{RequestCategory, build_payload, probe_payload};
pub use protocol::{Content, GenerateRequest, GenerateResponse, InlineData, Part};
pub use transport::{HttpReply, HttpTransport, Transport};
