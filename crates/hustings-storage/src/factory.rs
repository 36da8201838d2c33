use crate::{AssetStore, LocalStorage, StorageError, StorageResult};
use hustings_core::Config;
use std::sync::Arc;

/// Create the asset store described by the configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn AssetStore>> {
    config
        .validate()
        .map_err(|e| StorageError::ConfigError(e.to_string()))?;

    let storage = LocalStorage::new(
        config.storage_root(),
        config.base_url(),
        config.url_prefix(),
        config.namespace_rules().clone(),
    )
    .await?;

    tracing::info!(
        storage_root = %config.storage_root().display(),
        base_url = %config.base_url(),
        url_prefix = %config.url_prefix(),
        "Local asset storage ready"
    );

    Ok(Arc::new(storage))
}
