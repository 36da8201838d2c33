//! Helpers for the `hustings` command-line tool.

use hustings_core::timestamped_stem;
use std::path::Path;

/// Content type for a local file, from its extension.
///
/// Only extensions that map onto the accepted content types are known.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" | "m4v" => "video/mp4",
        "avi" => "video/avi",
        "mov" => "video/mov",
        "mkv" => "video/mkv",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "aac" => "audio/aac",
        "weba" | "webm" => "audio/webm",
        _ => return None,
    };
    Some(content_type)
}

/// Stem for a file ingested without `--stem`: its own stem plus a millisecond timestamp.
pub fn default_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    timestamped_stem(&stem)
}
