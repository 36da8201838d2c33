//! Configuration module
//!
//! Settings for the storage layout, the public URL shape and the transcoders.
//! Loaded from the environment (with `.env` support) by [`Config::from_env`];
//! tests build one directly with [`Config::new`] and the `with_*` setters.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    AUDIO_BITRATE_KBPS, DEFAULT_FFMPEG_PATH, DEFAULT_NESTED_PREFIX, DEFAULT_SERVER_URL,
    DEFAULT_UPLOAD_ROOT, DEFAULT_UPLOAD_URL_PREFIX, IMAGE_MAX_WIDTH, IMAGE_QUALITY, VIDEO_CRF,
    VIDEO_PRESET,
};
use crate::namespace::NamespaceRules;

/// Media pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    // Storage layout
    pub storage_root: PathBuf,
    pub base_url: String,
    pub url_prefix: String,
    pub namespace_rules: NamespaceRules,
    // Scratch files for the external transcoder; None = system temp dir
    pub scratch_dir: Option<PathBuf>,
    // Transcoding
    pub ffmpeg_path: String,
    pub image_max_width: u32,
    pub image_quality: u8,
    pub video_preset: String,
    pub video_crf: u8,
    pub audio_bitrate_kbps: u32,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PipelineConfig>);

impl Config {
    /// Configuration with default transcoder settings for the given storage root and base URL.
    pub fn new(storage_root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Config(Box::new(PipelineConfig {
            storage_root: storage_root.into(),
            base_url: base_url.into(),
            url_prefix: DEFAULT_UPLOAD_URL_PREFIX.to_string(),
            namespace_rules: NamespaceRules::default(),
            scratch_dir: None,
            ffmpeg_path: DEFAULT_FFMPEG_PATH.to_string(),
            image_max_width: IMAGE_MAX_WIDTH,
            image_quality: IMAGE_QUALITY,
            video_preset: VIDEO_PRESET.to_string(),
            video_crf: VIDEO_CRF,
            audio_bitrate_kbps: AUDIO_BITRATE_KBPS,
        }))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PipelineConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    fn as_pipeline(&self) -> &PipelineConfig {
        &self.0
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_pipeline().validate()
    }

    pub fn with_url_prefix(mut self, url_prefix: impl Into<String>) -> Self {
        self.0.url_prefix = url_prefix.into();
        self
    }

    pub fn with_namespace_rules(mut self, rules: NamespaceRules) -> Self {
        self.0.namespace_rules = rules;
        self
    }

    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.0.scratch_dir = Some(scratch_dir.into());
        self
    }

    pub fn with_ffmpeg_path(mut self, ffmpeg_path: impl Into<String>) -> Self {
        self.0.ffmpeg_path = ffmpeg_path.into();
        self
    }

    pub fn with_image_max_width(mut self, width: u32) -> Self {
        self.0.image_max_width = width;
        self
    }

    pub fn storage_root(&self) -> &Path {
        &self.as_pipeline().storage_root
    }

    pub fn base_url(&self) -> &str {
        &self.as_pipeline().base_url
    }

    pub fn url_prefix(&self) -> &str {
        &self.as_pipeline().url_prefix
    }

    pub fn namespace_rules(&self) -> &NamespaceRules {
        &self.as_pipeline().namespace_rules
    }

    /// Scratch directory, falling back to the system temp dir.
    pub fn scratch_dir(&self) -> PathBuf {
        self.as_pipeline()
            .scratch_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_pipeline().ffmpeg_path
    }

    pub fn image_max_width(&self) -> u32 {
        self.as_pipeline().image_max_width
    }

    pub fn image_quality(&self) -> u8 {
        self.as_pipeline().image_quality
    }

    pub fn video_preset(&self) -> &str {
        &self.as_pipeline().video_preset
    }

    pub fn video_crf(&self) -> u8 {
        self.as_pipeline().video_crf
    }

    pub fn audio_bitrate_kbps(&self) -> u32 {
        self.as_pipeline().audio_bitrate_kbps
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let base_url = env::var("SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        let storage_root = env::var("UPLOAD_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_ROOT));

        let url_prefix = env::var("UPLOAD_URL_PREFIX")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_URL_PREFIX.to_string())
            .trim_matches('/')
            .to_string();

        let nested_prefixes: Vec<String> = env::var("NESTED_NAMESPACE_PREFIXES")
            .unwrap_or_else(|_| DEFAULT_NESTED_PREFIX.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();
        let namespace_rules = NamespaceRules::new(&nested_prefixes)
            .map_err(|e| anyhow::anyhow!("Invalid NESTED_NAMESPACE_PREFIXES: {}", e))?;

        let scratch_dir = env::var("SCRATCH_DIR").ok().map(PathBuf::from);

        let ffmpeg_path =
            env::var("FFMPEG_PATH").unwrap_or_else(|_| DEFAULT_FFMPEG_PATH.to_string());

        let image_max_width = env::var("IMAGE_MAX_WIDTH")
            .unwrap_or_else(|_| IMAGE_MAX_WIDTH.to_string())
            .parse::<u32>()
            .unwrap_or(IMAGE_MAX_WIDTH);

        let image_quality = env::var("IMAGE_QUALITY")
            .unwrap_or_else(|_| IMAGE_QUALITY.to_string())
            .parse::<u8>()
            .unwrap_or(IMAGE_QUALITY);

        let video_preset = env::var("VIDEO_PRESET").unwrap_or_else(|_| VIDEO_PRESET.to_string());

        let video_crf = env::var("VIDEO_CRF")
            .unwrap_or_else(|_| VIDEO_CRF.to_string())
            .parse::<u8>()
            .unwrap_or(VIDEO_CRF);

        let audio_bitrate_kbps = env::var("AUDIO_BITRATE_KBPS")
            .unwrap_or_else(|_| AUDIO_BITRATE_KBPS.to_string())
            .parse::<u32>()
            .unwrap_or(AUDIO_BITRATE_KBPS);

        Ok(PipelineConfig {
            storage_root,
            base_url,
            url_prefix,
            namespace_rules,
            scratch_dir,
            ffmpeg_path,
            image_max_width,
            image_quality,
            video_preset,
            video_crf,
            audio_bitrate_kbps,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base_url.trim_end_matches('/').is_empty() {
            return Err(anyhow::anyhow!("SERVER_URL must not be empty"));
        }

        if self.url_prefix.is_empty() || self.url_prefix.contains('/') {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_PREFIX must be a single non-empty path segment"
            ));
        }

        if self.image_max_width == 0 {
            return Err(anyhow::anyhow!("IMAGE_MAX_WIDTH must be greater than 0"));
        }

        if !(1..=100).contains(&self.image_quality) {
            return Err(anyhow::anyhow!("IMAGE_QUALITY must be between 1 and 100"));
        }

        if self.video_crf > 51 {
            return Err(anyhow::anyhow!("VIDEO_CRF must be between 0 and 51"));
        }

        if self.audio_bitrate_kbps == 0 {
            return Err(anyhow::anyhow!("AUDIO_BITRATE_KBPS must be greater than 0"));
        }

        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if self.ffmpeg_path.is_empty()
            || self.ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c))
        {
            return Err(anyhow::anyhow!(
                "FFMPEG_PATH contains dangerous characters: {}",
                self.ffmpeg_path
            ));
        }

        if !self
            .video_preset
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(anyhow::anyhow!("VIDEO_PRESET must be alphanumeric"));
        }

        Ok(())
    }
}
