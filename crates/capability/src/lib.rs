//! Capability traits for platform collaborators
//!
//! The request core is deliberately ignorant of how a screen image is
//! produced, how status text reaches the user, and how answer text becomes
//! keystrokes. Those are platform concerns (compositor APIs, overlay
//! windows, input injection) provided by whatever desktop integration hosts
//! the binary. This crate defines the seams and ships trivial in-repo
//! implementations so the pipeline runs end to end without any of them:
//! `FileFrameSource` reads the frame from a path, `LogStatusSink` routes
//! status lines through tracing, `EchoKeySink` writes taps to stdout.

pub mod console;
pub mod file_source;

pub use console::{EchoKeySink, LogStatusSink};
pub use file_source::FileFrameSource;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Errors from capability implementations.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("no frame available: {0}")]
    NoFrame(String),

    #[error("key output failed: {0}")]
    KeyOutput(String),
}

/// Result alias for capability operations.
pub type Result<T> = std::result::Result<T, CapabilityError>;

/// A single synthetic key tap emitted by the typing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTap {
    /// A printable character
    Char(char),
    /// The Enter key (line breaks are tapped, not typed)
    Enter,
}

/// Source of screen frames as encoded PNG bytes.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn FrameSource>`).
pub trait FrameSource: Send + Sync {
    /// Identifier for logging (e.g. "file", "compositor")
    fn id(&self) -> &str;

    /// Produce the current frame as PNG bytes.
    fn grab(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>>;
}

/// Transient on-screen status indicator.
///
/// `show` is fire-and-forget: implementations decide how (and whether) the
/// message is rendered and for how long `duration` is honored.
pub trait StatusSink: Send + Sync {
    /// Display a short status message for roughly `duration`.
    fn show(&self, message: &str, duration: Duration);
}

/// Sink for synthetic keystrokes replayed by the typing engine.
pub trait KeySink: Send + Sync {
    /// Emit one key tap.
    fn tap(&self, tap: KeyTap) -> Result<()>;
}
