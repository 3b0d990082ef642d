//! Error types shared across Lipsyncer crates.

/// Top-level error type for Lipsyncer operations.
#[derive(Debug, thiserror::Error)]
pub enum LipsyncError {
    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using LipsyncError.
pub type LipsyncResult<T> = Result<T, LipsyncError>;

impl LipsyncError {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LipsyncError::export("disk full");
        assert_eq!(err.to_string(), "Export error: disk full");

        let err = LipsyncError::config("frame rate must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Configuration error: frame rate must be greater than zero"
        );
    }

    #[test]
    fn test_io_conversion() {
        fn fails() -> LipsyncResult<()> {
            std::fs::read_to_string("/nonexistent/lipsyncer/cues.json")?;
            Ok(())
        }
        assert!(matches!(fails(), Err(LipsyncError::Io(_))));
    }
}
