//! Error types module
//!
//! `MediaError` is the taxonomy surfaced to the callers of the ingestion
//! pipeline. Eviction never returns it; eviction failures are only logged.

use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like rejected input
    Debug,
    /// Warning level - for failures tied to a specific buffer
    Warn,
    /// Error level - for environment or tooling failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    #[error("Failed to verify saved file: {}", .0.display())]
    VerificationFailed(PathBuf),
}

impl MediaError {
    /// Machine-readable error code (e.g., "UNSUPPORTED_TYPE")
    pub fn error_code(&self) -> &'static str {
        match self {
            MediaError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            MediaError::InvalidInput(_) => "INVALID_INPUT",
            MediaError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            MediaError::CompressionFailed(_) => "COMPRESSION_FAILED",
            MediaError::VerificationFailed(_) => "VERIFICATION_FAILED",
        }
    }

    /// Whether the error was caused by the caller's input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MediaError::UnsupportedType(_)
                | MediaError::InvalidInput(_)
                | MediaError::CompressionFailed(_)
        )
    }

    pub fn log_level(&self) -> LogLevel {
        match self {
            MediaError::UnsupportedType(_) | MediaError::InvalidInput(_) => LogLevel::Debug,
            MediaError::CompressionFailed(_) => LogLevel::Warn,
            MediaError::StorageUnavailable(_) | MediaError::VerificationFailed(_) => {
                LogLevel::Error
            }
        }
    }
}
