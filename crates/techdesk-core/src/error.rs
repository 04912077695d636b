//! Error types for the Techdesk application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Techdesk application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TechdeskError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The uploaded file is not a manual format the model accepts
    #[error("Unsupported file type: {name} ({mime_type})")]
    UnsupportedFileType { name: String, mime_type: String },

    /// Error reported by the hosted model API or its transport
    #[error("Model API error: {message}")]
    Api {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
    },

    /// A chat turn is still streaming
    #[error("Session is busy: a response is still streaming")]
    SessionBusy,

    /// No manual has been loaded into the session yet
    #[error("No manual loaded: upload a manual first")]
    NoActiveManual,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TechdeskError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Creates an Api error without an HTTP status (transport or decoding failure)
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status_code: None,
            message: message.into(),
            is_retryable: false,
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error came from the model API
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TechdeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TechdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TechdeskError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at the binary edge)
impl From<anyhow::Error> for TechdeskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, TechdeskError>`.
pub type Result<T> = std::result::Result<T, TechdeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let err: TechdeskError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "manual.pdf").into();
        assert!(err.is_io());
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let err: TechdeskError = parse.into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_api_helper_is_not_retryable() {
        match TechdeskError::api("connection reset") {
            TechdeskError::Api {
                status_code,
                is_retryable,
                ..
            } => {
                assert_eq!(status_code, None);
                assert!(!is_retryable);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
