//! Transcoder trait shared by the per-family backends.

use async_trait::async_trait;
use bytes::Bytes;
use hustings_core::{MediaError, MediaFamily};
use std::path::Path;

/// Converts one uploaded buffer into the canonical format of its family.
///
/// Implementations write only to `output`; the engine owns naming and the
/// final rename into place.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Family this transcoder produces.
    fn family(&self) -> MediaFamily;

    /// Transcode `data` (declared as `content_type`) and write the result to `output`.
    async fn transcode(
        &self,
        data: Bytes,
        content_type: &str,
        output: &Path,
    ) -> Result<(), MediaError>;
}
