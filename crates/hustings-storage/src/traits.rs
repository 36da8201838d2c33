//! Storage abstraction trait
//!
//! This module defines the `AssetStore` trait: directory resolution, URL
//! publication and URL-driven removal for stored assets.

use async_trait::async_trait;
use hustings_core::{MediaError, Namespace, NamespaceRules};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to verify saved file: {}", .0.display())]
    VerificationFailed(PathBuf),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for MediaError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::VerificationFailed(path) => MediaError::VerificationFailed(path),
            StorageError::InvalidKey(msg) => MediaError::InvalidInput(msg),
            other => MediaError::StorageUnavailable(other.to_string()),
        }
    }
}

/// What a removal did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// False when the file was already gone.
    pub file_removed: bool,
    /// Number of empty entity directories removed afterwards.
    pub pruned_dirs: usize,
}

/// Storage abstraction trait
///
/// The only handle to a stored asset is the URL returned by [`publish`](Self::publish);
/// [`remove`](Self::remove) and [`locate`](Self::locate) must map it back to the exact
/// path it was published from.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Create (idempotently) and return the directory for a namespace.
    async fn resolve(&self, namespace: &Namespace) -> StorageResult<PathBuf>;

    /// Verify `<directory>/<filename>` is present and readable, then build its public URL.
    async fn publish(
        &self,
        directory: &Path,
        filename: &str,
        namespace: &Namespace,
    ) -> StorageResult<String>;

    /// Delete the file behind a published URL and prune empty entity directories.
    ///
    /// A missing file is not an error.
    async fn remove(&self, url: &str) -> StorageResult<RemoveOutcome>;

    /// On-disk path for a published URL, without touching the filesystem.
    fn locate(&self, url: &str) -> StorageResult<PathBuf>;

    /// Rules used to parse namespaces for this store.
    fn namespace_rules(&self) -> &NamespaceRules;
}
