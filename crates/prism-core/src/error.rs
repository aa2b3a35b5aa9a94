//! Error types for Prism.
//!
//! Generation failures are scoped to the single prompt entry that produced
//! them; nothing in this module is process-fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Prism operations.
#[derive(Error, Debug)]
pub enum PrismError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unknown model or size identifiers
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Per-entry generation failures
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Bulk prompt import failures
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Image export failures
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Lookup failures against the static model/size catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown image size: {0}")]
    UnknownSize(String),

    #[error("No prompt at index {index} (set has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failure reported by a generation service backend.
///
/// `status_code` carries the HTTP status when the failure came from an HTTP
/// response; transport and parse failures leave it `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

/// Outcome of a failed generation for one prompt entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No credential configured. The service was not contacted.
    #[error("API key not configured")]
    MissingCredential,

    /// The service rejected the credential.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Any other submission or runtime failure.
    #[error("{message}")]
    Failed { message: String },
}

impl GenerationError {
    /// True when the caller should prompt for a new credential.
    pub fn needs_credential(&self) -> bool {
        matches!(
            self,
            GenerationError::MissingCredential | GenerationError::Auth { .. }
        )
    }
}

/// Bulk prompt import errors.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("No prompts found in {0}")]
    Empty(PathBuf),
}

/// Image export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience type alias for Prism results.
pub type Result<T> = std::result::Result<T, PrismError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_credential() {
        assert!(GenerationError::MissingCredential.needs_credential());
        assert!(GenerationError::Auth {
            message: "HTTP 401".into()
        }
        .needs_credential());
        assert!(!GenerationError::Failed {
            message: "boom".into()
        }
        .needs_credential());
    }

    #[test]
    fn test_service_error_display_is_message() {
        let err = ServiceError::with_status(500, "fal HTTP 500: oops");
        assert_eq!(err.to_string(), "fal HTTP 500: oops");
        assert_eq!(err.status_code, Some(500));
    }
}
