//! Content-type gate in front of the transcoders.

use hustings_core::{normalize_content_type, MediaError, MediaFamily};

/// Maps a declared content type to its media family.
///
/// Only the fixed allow-list is accepted. Parameters (`;codecs=...`) and case
/// are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatClassifier;

impl FormatClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify `content_type`, failing with `UnsupportedType` for anything outside the allow-list.
    pub fn classify(&self, content_type: &str) -> Result<MediaFamily, MediaError> {
        MediaFamily::classify(content_type)
    }

    pub fn is_allowed(&self, content_type: &str) -> bool {
        MediaFamily::from_content_type(content_type).is_some()
    }

    /// Every accepted content type, grouped by family.
    pub fn allowed_content_types(&self) -> Vec<&'static str> {
        [MediaFamily::Image, MediaFamily::Video, MediaFamily::Audio]
            .iter()
            .flat_map(|family| family.allowed_content_types().iter().copied())
            .collect()
    }

    /// Container name passed to the transcoder with `-f` for an audio upload.
    pub fn audio_input_format(&self, content_type: &str) -> Result<&'static str, MediaError> {
        match normalize_content_type(content_type).as_str() {
            "audio/webm" => Ok("webm"),
            "audio/ogg" => Ok("ogg"),
            "audio/wav" => Ok("wav"),
            "audio/mpeg" => Ok("mp3"),
            "audio/aac" => Ok("aac"),
            other => Err(MediaError::UnsupportedType(other.to_string())),
        }
    }

    /// Scratch-file extension for a video upload.
    pub fn video_input_extension(&self, content_type: &str) -> Result<&'static str, MediaError> {
        match normalize_content_type(content_type).as_str() {
            "video/mp4" => Ok("mp4"),
            "video/avi" => Ok("avi"),
            "video/mov" => Ok("mov"),
            "video/mkv" => Ok("mkv"),
            other => Err(MediaError::UnsupportedType(other.to_string())),
        }
    }
}
