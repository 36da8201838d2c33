//! Media families and stored filename rules.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::{AUDIO_CONTENT_TYPES, IMAGE_CONTENT_TYPES, VIDEO_CONTENT_TYPES};
use crate::error::MediaError;

/// The three media families accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFamily {
    Image,
    Video,
    Audio,
}

impl MediaFamily {
    /// Match a declared content type against the allow-list.
    ///
    /// Matching ignores case and any parameters after `;`. Returns `None` for
    /// anything outside the list; there is no fallback family.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let normalized = normalize_content_type(content_type);
        let normalized = normalized.as_str();

        if IMAGE_CONTENT_TYPES.contains(&normalized) {
            Some(MediaFamily::Image)
        } else if VIDEO_CONTENT_TYPES.contains(&normalized) {
            Some(MediaFamily::Video)
        } else if AUDIO_CONTENT_TYPES.contains(&normalized) {
            Some(MediaFamily::Audio)
        } else {
            None
        }
    }

    /// Like [`from_content_type`](Self::from_content_type) but fails with `UnsupportedType`.
    pub fn classify(content_type: &str) -> Result<Self, MediaError> {
        Self::from_content_type(content_type)
            .ok_or_else(|| MediaError::UnsupportedType(content_type.to_string()))
    }

    pub fn canonical_extension(self) -> &'static str {
        match self {
            MediaFamily::Image => "webp",
            MediaFamily::Video => "mp4",
            MediaFamily::Audio => "mp3",
        }
    }

    pub fn canonical_content_type(self) -> &'static str {
        match self {
            MediaFamily::Image => "image/webp",
            MediaFamily::Video => "video/mp4",
            MediaFamily::Audio => "audio/mpeg",
        }
    }

    pub fn allowed_content_types(self) -> &'static [&'static str] {
        match self {
            MediaFamily::Image => IMAGE_CONTENT_TYPES,
            MediaFamily::Video => VIDEO_CONTENT_TYPES,
            MediaFamily::Audio => AUDIO_CONTENT_TYPES,
        }
    }
}

impl Display for MediaFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaFamily::Image => write!(f, "image"),
            MediaFamily::Video => write!(f, "video"),
            MediaFamily::Audio => write!(f, "audio"),
        }
    }
}

/// Lowercase the MIME essence and drop parameters (`audio/webm;codecs=opus` -> `audio/webm`).
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Build the on-disk filename `<stem>.<canonical extension>`.
///
/// A trailing `.<word>` extension on the caller's stem is dropped first, so
/// `logo_1.png` becomes `logo_1.webp` for an image. The caller's extension
/// never survives.
pub fn canonical_filename(stem: &str, family: MediaFamily) -> Result<String, MediaError> {
    let base = strip_extension(stem.trim());
    validate_stem(base)?;
    Ok(format!("{}.{}", base, family.canonical_extension()))
}

/// Disambiguated stem in the `<prefix>_<unix millis>` convention.
pub fn timestamped_stem(prefix: &str) -> String {
    format!("{}_{}", prefix, chrono::Utc::now().timestamp_millis())
}

fn strip_extension(stem: &str) -> &str {
    if let Some(idx) = stem.rfind('.') {
        let ext = &stem[idx + 1..];
        if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return &stem[..idx];
        }
    }
    stem
}

fn validate_stem(stem: &str) -> Result<(), MediaError> {
    if stem.is_empty() || stem == "." || stem == ".." {
        return Err(MediaError::InvalidInput(format!(
            "file stem must not be empty: {:?}",
            stem
        )));
    }
    if stem.contains(['/', '\\', '\0']) {
        return Err(MediaError::InvalidInput(format!(
            "file stem must be a single path component: {:?}",
            stem
        )));
    }
    Ok(())
}
