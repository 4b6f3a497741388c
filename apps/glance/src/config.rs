//! Configuration types and loading
//!
//! Credentials and model ids come from the process environment at startup
//! (no runtime reconfiguration). The TOML file only carries glue settings:
//! frame path, typing cadence, log file. The file is optional; a missing
//! file means defaults, a present-but-invalid file is an error.

use std::path::{Path, PathBuf};

use gemini_client::resolve_model;
use gemini_pool::CategoryModels;
use serde::Deserialize;

/// Root configuration
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub typing: TypingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Frame source settings
#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// Path the capture collaborator writes the current frame to
    #[serde(default = "default_frame_path")]
    pub frame_path: PathBuf,
}

/// Typing engine settings
#[derive(Debug, Deserialize)]
pub struct TypingConfig {
    /// Delay between key taps, in milliseconds
    #[serde(default = "default_typing_interval_ms")]
    pub interval_ms: u64,
}

/// Log output settings
#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    /// Optional log file written alongside stderr output
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_frame_path() -> PathBuf {
    std::env::temp_dir().join("glance-frame.png")
}

fn default_typing_interval_ms() -> u64 {
    15
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_path: default_frame_path(),
        }
    }
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_typing_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// a file that exists but fails to parse or validate is an error.
    pub fn load(path: &Path) -> common::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        if config.typing.interval_ms == 0 {
            return Err(common::Error::Config(
                "typing.interval_ms must be greater than 0".into(),
            ));
        }
        if config.capture.frame_path.as_os_str().is_empty() {
            return Err(common::Error::Config(
                "capture.frame_path must not be empty".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("glance.toml")
    }
}

/// Per-category model ids from `CLASSIFICATION_MODEL` / `GENERATION_MODEL`,
/// unknown or unset ids resolved to the stock model.
pub fn models_from_env() -> CategoryModels {
    let classification = std::env::var("CLASSIFICATION_MODEL")
        .map(|m| resolve_model(m.trim()).to_string())
        .unwrap_or_else(|_| gemini_client::DEFAULT_MODEL.to_string());
    let generation = std::env::var("GENERATION_MODEL")
        .map(|m| resolve_model(m.trim()).to_string())
        .unwrap_or_else(|_| gemini_client::DEFAULT_MODEL.to_string());
    CategoryModels {
        classification,
        generation,
    }
}
