//! Console-backed collaborator implementations
//!
//! `LogStatusSink` and `EchoKeySink` stand in for the overlay and input
//! injection collaborators. Status lines go through tracing so they land
//! wherever the subscriber sends them; key taps are written to stdout, which
//! makes typing runs observable (and assertable) without an input stack.

use std::io::Write;
use std::time::Duration;

use tracing::info;

use crate::{CapabilityError, KeySink, KeyTap, Result, StatusSink};

/// Status sink that logs messages instead of rendering an overlay.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn show(&self, message: &str, duration: Duration) {
        info!(duration_secs = duration.as_secs(), "{message}");
    }
}

/// Key sink that echoes taps to stdout.
pub struct EchoKeySink;

impl KeySink for EchoKeySink {
    fn tap(&self, tap: KeyTap) -> Result<()> {
        let mut out = std::io::stdout().lock();
        let result = match tap {
            KeyTap::Char(c) => write!(out, "{c}"),
            KeyTap::Enter => writeln!(out),
        };
        result.map_err(|e| CapabilityError::KeyOutput(e.to_string()))
    }
}
