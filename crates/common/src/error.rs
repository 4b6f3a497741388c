//! Common error types

use thiserror::Error;

/// Common error type for configuration and startup plumbing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment error: {0}")]
    Env(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_context() {
        let config_err = Error::Config("typing interval must be non-zero".into());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: typing interval must be non-zero"
        );

        let env_err = Error::Env("GEMINI_API_KEY not set".into());
        assert_eq!(env_err.to_string(), "Environment error: GEMINI_API_KEY not set");

        let io_err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(
            io_err.to_string().starts_with("I/O error:"),
            "got: {}",
            io_err
        );
    }

    #[test]
    fn error_debug_includes_variant() {
        let err = Error::Env("missing".into());
        let debug = format!("{:?}", err);
        assert!(
            debug.contains("Env"),
            "Debug should include variant name, got: {debug}"
        );
    }
}
