//! folio error types
//!
//! Parsing never produces errors: every pattern is optional and a miss is a
//! missing field. Errors only come from configuration and from the filesystem
//! collaborator. Write failures are recorded per page by the pipeline and do
//! not abort the batch.

use std::path::PathBuf;

use thiserror::Error;

/// Error category for structured logging and report grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// `folio.toml` missing fields, unparsable, or inconsistent
    ConfigError,
    /// Reading or writing a document failed
    IoError,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
        }
    }

    /// Whether the batch can keep going after this error
    pub fn batch_recoverable(&self) -> bool {
        matches!(self, Self::IoError)
    }
}

/// folio error with category and context
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FolioError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::ConfigError,
            Self::Io { .. } => ErrorCategory::IoError,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error bound to the path it happened on
    pub fn io_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for folio operations
pub type Result<T> = std::result::Result<T, FolioError>;
