use crate::keys::{self, AssetKey};
use crate::traits::{AssetStore, RemoveOutcome, StorageError, StorageResult};
use async_trait::async_trait;
use hustings_core::{Namespace, NamespacePolicy, NamespaceRules};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    base: Url,
    url_prefix: String,
    rules: NamespaceRules,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Storage root (e.g., "/var/lib/hustings/Uploads")
    /// * `base_url` - Public base URL of the static file server (e.g., "http://localhost:5000")
    /// * `url_prefix` - URL segment under which the storage root is served (e.g., "Uploads")
    /// * `rules` - Namespace policy rules
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: impl Into<String>,
        url_prefix: impl Into<String>,
        rules: NamespaceRules,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();
        let base_url = base_url.into();
        let base = keys::parse_base_url(&base_url)?;

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            base,
            url_prefix: url_prefix.into(),
            rules,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory for a namespace, without creating it.
    pub fn namespace_dir(&self, namespace: &Namespace) -> PathBuf {
        namespace
            .effective_segments()
            .into_iter()
            .fold(self.base_path.clone(), |dir, segment| dir.join(segment))
    }

    fn key_to_path(&self, key: &AssetKey) -> PathBuf {
        key.segments
            .iter()
            .fold(self.base_path.clone(), |dir, segment| dir.join(segment))
            .join(&key.filename)
    }

    /// Create a single directory, treating an existing directory as success.
    async fn ensure_dir(path: &Path) -> StorageResult<()> {
        match fs::create_dir(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Created directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let meta = fs::metadata(path).await.map_err(|e| {
                    StorageError::Unavailable(format!(
                        "Failed to stat directory {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                if meta.is_dir() {
                    Ok(())
                } else {
                    Err(StorageError::Unavailable(format!(
                        "Path exists and is not a directory: {}",
                        path.display()
                    )))
                }
            }
            Err(e) => Err(StorageError::Unavailable(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Create and drop a hidden file in `path` to prove the directory accepts writes.
    async fn ensure_writable(path: &Path) -> StorageResult<()> {
        let dir = path.to_path_buf();
        let checked = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".write-check")
                .tempfile_in(&dir)
                .map(drop)
        })
        .await
        .map_err(|e| StorageError::Unavailable(format!("Write check task failed: {}", e)))?;

        checked.map_err(|e| {
            StorageError::Unavailable(format!(
                "Directory is not writable: {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Remove empty directories from `start` upwards, stopping below `boundary`.
    ///
    /// Uses non-recursive `remove_dir`, so a directory that is not empty at
    /// the moment of removal is left alone and ends the walk.
    async fn prune_empty_dirs(start: &Path, boundary: &Path) -> usize {
        let mut pruned = 0;
        let mut current = start.to_path_buf();

        while current.as_path() != boundary && current.starts_with(boundary) {
            match fs::remove_dir(&current).await {
                Ok(()) => {
                    pruned += 1;
                    tracing::debug!(path = %current.display(), "Pruned empty directory");
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::debug!(
                        path = %current.display(),
                        error = %e,
                        "Directory kept"
                    );
                    break;
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        pruned
    }
}

#[async_trait]
impl AssetStore for LocalStorage {
    async fn resolve(&self, namespace: &Namespace) -> StorageResult<PathBuf> {
        if !fs::try_exists(&self.base_path).await.unwrap_or(false) {
            fs::create_dir_all(&self.base_path).await.map_err(|e| {
                StorageError::Unavailable(format!(
                    "Failed to create storage root {}: {}",
                    self.base_path.display(),
                    e
                ))
            })?;
        }

        let mut dir = self.base_path.clone();
        for segment in namespace.effective_segments() {
            dir.push(segment);
            Self::ensure_dir(&dir).await?;
        }

        Self::ensure_writable(&dir).await?;

        tracing::debug!(
            namespace = %namespace,
            path = %dir.display(),
            "Namespace directory resolved"
        );

        Ok(dir)
    }

    async fn publish(
        &self,
        directory: &Path,
        filename: &str,
        namespace: &Namespace,
    ) -> StorageResult<String> {
        let expected = self.namespace_dir(namespace);
        if directory != expected.as_path() {
            return Err(StorageError::InvalidKey(format!(
                "Directory {} does not belong to namespace {}",
                directory.display(),
                namespace
            )));
        }

        let path = directory.join(filename);

        let is_file = fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file || fs::File::open(&path).await.is_err() {
            tracing::error!(path = %path.display(), "File not found on disk after transcoding");
            return Err(StorageError::VerificationFailed(path));
        }

        let url = keys::public_url(&self.base_url, &self.url_prefix, namespace, filename);

        tracing::info!(path = %path.display(), url = %url, "Published stored file");

        Ok(url)
    }

    async fn remove(&self, url: &str) -> StorageResult<RemoveOutcome> {
        let key = keys::parse_asset_url(url, &self.base, &self.url_prefix)?;
        let path = self.key_to_path(&key);
        let start = std::time::Instant::now();

        let file_removed = match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted file");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "File not found for deletion");
                false
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        // The same rules that added the `images` suffix decide what is entity-owned.
        let namespace = self
            .rules
            .parse(&key.namespace_path())
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;

        let pruned_dirs = match (namespace.policy(), path.parent()) {
            (NamespacePolicy::NestedWithImagesSuffix, Some(parent)) => {
                let boundary = self.base_path.join(namespace.shared_root());
                Self::prune_empty_dirs(parent, &boundary).await
            }
            _ => 0,
        };

        tracing::info!(
            path = %path.display(),
            file_removed,
            pruned_dirs,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage remove completed"
        );

        Ok(RemoveOutcome {
            file_removed,
            pruned_dirs,
        })
    }

    fn locate(&self, url: &str) -> StorageResult<PathBuf> {
        let key = keys::parse_asset_url(url, &self.base, &self.url_prefix)?;
        Ok(self.key_to_path(&key))
    }

    fn namespace_rules(&self) -> &NamespaceRules {
        &self.rules
    }
}
