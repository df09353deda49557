//! Error types for salescast
//!
//! One error enum covers model fetching, loading, prediction and input
//! handling so the CLI and the web layer can report failures uniformly.

use thiserror::Error;

/// Main error type for salescast
#[derive(Error, Debug)]
pub enum SalesError {
    /// No model is available to answer predictions
    #[error("Model not available: {0}")]
    ModelNotLoaded(String),

    /// Model artifact download failed
    #[error("Failed to download model from {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Artifact parsed but does not describe a usable regressor
    #[error("Invalid model artifact: {0}")]
    ModelFormat(String),

    /// Feature vector length does not match what the model was fitted on
    #[error("Feature count mismatch: model expects {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// A user-entered field violates its widget constraints
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for salescast operations
pub type Result<T> = std::result::Result<T, SalesError>;

impl SalesError {
    /// Shorthand for an input validation failure
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        SalesError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, SalesError::InvalidInput { .. } | SalesError::FeatureMismatch { .. })
    }
}

/// Convert anyhow errors to SalesError
impl From<anyhow::Error> for SalesError {
    fn from(err: anyhow::Error) -> Self {
        SalesError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SalesError::FeatureMismatch {
            expected: 13,
            actual: 12,
        };
        assert!(err.to_string().contains("13"));
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_download_error_mentions_url() {
        let err = SalesError::DownloadFailed {
            url: "https://example.com/model.json".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/model.json"));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(SalesError::invalid_input("month", "must be 1-12").is_client_error());
        assert!(!SalesError::ModelNotLoaded("missing".to_string()).is_client_error());
    }
}
