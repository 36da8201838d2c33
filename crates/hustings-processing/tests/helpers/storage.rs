use hustings_core::Config;
use hustings_processing::MediaPipeline;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:5000";

/// Isolated storage root and scratch directory.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub scratch: PathBuf,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let root = temp_dir.path().join("Uploads");
        let scratch = temp_dir.path().join("scratch");
        std::fs::create_dir_all(&scratch).expect("Failed to create scratch directory");
        Self {
            temp_dir,
            root,
            scratch,
        }
    }

    pub fn config(&self) -> Config {
        Config::new(&self.root, BASE_URL).with_scratch_dir(&self.scratch)
    }

    pub async fn pipeline(&self) -> MediaPipeline {
        self.pipeline_with(self.config()).await
    }

    pub async fn pipeline_with(&self, config: Config) -> MediaPipeline {
        MediaPipeline::from_config(&config)
            .await
            .expect("Failed to build pipeline")
    }

    /// Path below the storage root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, relative: &str) -> bool {
        Path::new(&self.path(relative)).exists()
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}
