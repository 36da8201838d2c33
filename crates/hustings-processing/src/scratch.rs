//! Temporary files used while transcoding.
//!
//! [`ScratchFile`] holds the uploaded bytes for the external transcoder and
//! [`PartialOutput`] holds the result until it is renamed into place. Both are
//! removed when dropped, so no failure path leaves a file behind.

use hustings_core::constants::SCRATCH_PREFIX;
use hustings_core::MediaError;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tokio::fs;

/// Prefix of in-progress outputs inside a namespace directory.
const PARTIAL_PREFIX: &str = ".partial_";

/// Uniquely named copy of an upload on disk.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    /// Write `data` to a new `scratch_*.<extension>` file in `dir`.
    pub async fn write(dir: &Path, data: &[u8], extension: &str) -> Result<Self, MediaError> {
        fs::create_dir_all(dir).await.map_err(|e| {
            MediaError::StorageUnavailable(format!(
                "Failed to create scratch directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let suffix = format!(".{}", extension);
        let file = Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|e| {
                MediaError::StorageUnavailable(format!(
                    "Failed to create scratch file in {}: {}",
                    dir.display(),
                    e
                ))
            })?;

        fs::write(file.path(), data).await.map_err(|e| {
            MediaError::StorageUnavailable(format!(
                "Failed to write scratch file {}: {}",
                file.path().display(),
                e
            ))
        })?;

        tracing::debug!(path = %file.path().display(), size = data.len(), "Scratch file written");

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now, logging instead of failing.
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove scratch file");
        }
    }
}

/// Hidden output file in the target directory, renamed to its final name on commit.
#[derive(Debug)]
pub struct PartialOutput {
    file: NamedTempFile,
    target: PathBuf,
}

impl PartialOutput {
    /// Reserve a partial file next to `<directory>/<filename>`.
    ///
    /// The partial keeps the target's extension so the transcoder can infer the container.
    pub fn create(directory: &Path, filename: &str) -> Result<Self, MediaError> {
        let suffix = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let file = Builder::new()
            .prefix(PARTIAL_PREFIX)
            .suffix(&suffix)
            .tempfile_in(directory)
            .map_err(|e| {
                MediaError::StorageUnavailable(format!(
                    "Failed to create output file in {}: {}",
                    directory.display(),
                    e
                ))
            })?;

        Ok(Self {
            file,
            target: directory.join(filename),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically rename the partial onto its target, replacing any existing file.
    pub fn commit(self) -> Result<PathBuf, MediaError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Temp files are created 0600; published assets must be world-readable.
            self.file
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(|e| {
                    MediaError::StorageUnavailable(format!(
                        "Failed to set permissions on {}: {}",
                        self.file.path().display(),
                        e
                    ))
                })?;
        }

        let target = self.target;
        self.file.persist(&target).map_err(|e| {
            MediaError::StorageUnavailable(format!(
                "Failed to move output into {}: {}",
                target.display(),
                e.error
            ))
        })?;

        Ok(target)
    }
}
