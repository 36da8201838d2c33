//! Ingest/evict facade over the asset store and the transcoding engine.
//!
//! This is the only surface callers need: `ingest` turns a buffer into a
//! published URL and `evict` undoes it. Path and URL derivation live behind
//! the [`AssetStore`], so both directions share one implementation.

use bytes::Bytes;
use hustings_core::{Config, LogLevel, MediaError};
use hustings_storage::{create_storage, AssetStore, RemoveOutcome};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::classifier::FormatClassifier;
use crate::engine::TranscodingEngine;

#[derive(Clone)]
pub struct MediaPipeline {
    storage: Arc<dyn AssetStore>,
    engine: TranscodingEngine,
    classifier: FormatClassifier,
}

impl MediaPipeline {
    pub fn new(storage: Arc<dyn AssetStore>, engine: TranscodingEngine) -> Self {
        Self {
            storage,
            engine,
            classifier: FormatClassifier::new(),
        }
    }

    /// Build the local store and the default transcoders from configuration.
    pub async fn from_config(config: &Config) -> Result<Self, MediaError> {
        let storage = create_storage(config).await?;
        Ok(Self::new(storage, TranscodingEngine::from_config(config)))
    }

    pub fn storage(&self) -> &Arc<dyn AssetStore> {
        &self.storage
    }

    pub fn classifier(&self) -> &FormatClassifier {
        &self.classifier
    }

    /// Store an upload and return its public URL.
    ///
    /// Steps: classify, parse the namespace, resolve its directory, transcode
    /// into it, verify and publish. An unsupported type fails before any
    /// directory is created.
    pub async fn ingest(
        &self,
        data: Bytes,
        content_type: &str,
        namespace: &str,
        stem: &str,
    ) -> Result<String, MediaError> {
        let span = tracing::info_span!(
            "media_ingest",
            ingest_id = %Uuid::new_v4(),
            namespace = %namespace,
            stem = %stem,
            content_type = %content_type,
            size = data.len(),
        );

        async move {
            let start = std::time::Instant::now();
            let result = self.ingest_inner(data, content_type, namespace, stem).await;

            match &result {
                Ok(url) => tracing::info!(
                    url = %url,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Media ingested"
                ),
                Err(e) => log_media_error(e, "Media ingest failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn ingest_inner(
        &self,
        data: Bytes,
        content_type: &str,
        namespace: &str,
        stem: &str,
    ) -> Result<String, MediaError> {
        self.classifier.classify(content_type)?;
        let namespace = self.storage.namespace_rules().parse(namespace)?;

        let directory = self.storage.resolve(&namespace).await?;
        let filename = match self
            .engine
            .transcode(data.clone(), content_type, &directory, stem)
            .await
        {
            // A concurrent evict may prune the directory before the output lands.
            Err(MediaError::StorageUnavailable(reason)) if !is_dir(&directory).await => {
                tracing::warn!(
                    directory = %directory.display(),
                    reason = %reason,
                    "Namespace directory vanished during ingest, resolving again"
                );
                let directory = self.storage.resolve(&namespace).await?;
                self.engine
                    .transcode(data, content_type, &directory, stem)
                    .await?
            }
            result => result?,
        };

        let url = self
            .storage
            .publish(&directory, &filename, &namespace)
            .await?;
        Ok(url)
    }

    /// Delete the asset behind `url`, pruning empty entity directories.
    ///
    /// Never fails: an empty URL is a no-op and errors are logged. Returns what
    /// was done on disk, or `None` when nothing could be done.
    pub async fn evict(&self, url: &str) -> Option<RemoveOutcome> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }

        let span = tracing::info_span!("media_evict", url = %url);
        async move {
            match self.storage.remove(url).await {
                Ok(outcome) => {
                    tracing::info!(
                        file_removed = outcome.file_removed,
                        pruned_dirs = outcome.pruned_dirs,
                        "Media evicted"
                    );
                    Some(outcome)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Media evict failed");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Evict every asset of a deleted record. Returns how many files were removed.
    pub async fn evict_all<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for url in urls {
            if let Some(outcome) = self.evict(url.as_ref()).await {
                if outcome.file_removed {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Ingest a new asset, then evict the one it supersedes.
    ///
    /// The old asset is kept when ingest fails. When the new URL equals the old
    /// one (same stem, same namespace) the file was overwritten in place and is
    /// not evicted.
    pub async fn replace(
        &self,
        old_url: Option<&str>,
        data: Bytes,
        content_type: &str,
        namespace: &str,
        stem: &str,
    ) -> Result<String, MediaError> {
        let url = self.ingest(data, content_type, namespace, stem).await?;

        if let Some(old_url) = old_url.map(str::trim).filter(|u| !u.is_empty()) {
            if old_url != url {
                self.evict(old_url).await;
            }
        }

        Ok(url)
    }
}

fn log_media_error(error: &MediaError, message: &str) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, code = error.error_code(), "{}", message),
        LogLevel::Warn => tracing::warn!(error = %error, code = error.error_code(), "{}", message),
        LogLevel::Error => tracing::error!(error = %error, code = error.error_code(), "{}", message),
    }
}

async fn is_dir(path: &std::path::Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
