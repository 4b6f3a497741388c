//! File-backed frame source
//!
//! Reads the frame from a fixed path. The capture collaborator (whatever
//! grabs the actual screen) is expected to keep that path current; this
//! source only consumes the bytes. Also the natural implementation for
//! development: drop any PNG at the path and trigger a request.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::debug;

use crate::{CapabilityError, FrameSource, Result};

/// Frame source that reads PNG bytes from a path on every grab.
pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FrameSource for FileFrameSource {
    fn id(&self) -> &str {
        "file"
    }

    fn grab(&self) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + '_>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
                CapabilityError::NoFrame(format!("{}: {e}", self.path.display()))
            })?;
            if bytes.is_empty() {
                return Err(CapabilityError::NoFrame(format!(
                    "{}: empty file",
                    self.path.display()
                )));
            }
            debug!(path = %self.path.display(), bytes = bytes.len(), "frame read");
            Ok(bytes)
        })
    }
}
