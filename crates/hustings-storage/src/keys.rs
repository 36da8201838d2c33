//! Shared URL and key derivation.
//!
//! URL format: `<base-url>/<url-prefix>/<effective namespace>/<encoded filename>`.
//! Only the filename is percent-encoded, with the same set as JavaScript's
//! `encodeURIComponent`. Namespace segments are restricted to URL-safe
//! characters by `NamespaceRules`, so they are emitted and parsed literally.

use hustings_core::Namespace;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{ParseError, Url};

use crate::traits::{StorageError, StorageResult};

/// Characters escaped in the filename segment.
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A published URL broken back into its storage parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetKey {
    /// Namespace segments exactly as they appear in the URL.
    pub segments: Vec<String>,
    /// Decoded filename.
    pub filename: String,
}

impl AssetKey {
    /// Slash-joined namespace path as it appears in the URL.
    pub fn namespace_path(&self) -> String {
        self.segments.join("/")
    }
}

pub fn encode_filename(filename: &str) -> String {
    utf8_percent_encode(filename, FILENAME_ENCODE_SET).to_string()
}

/// Build the public URL for a file in `namespace`.
pub fn public_url(base_url: &str, url_prefix: &str, namespace: &Namespace, filename: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        base_url.trim_end_matches('/'),
        url_prefix,
        namespace.effective_path(),
        encode_filename(filename)
    )
}

/// Parse the configured public base URL.
pub fn parse_base_url(base_url: &str) -> StorageResult<Url> {
    let base = Url::parse(base_url)
        .map_err(|e| StorageError::ConfigError(format!("Invalid base URL {}: {}", base_url, e)))?;
    if base.cannot_be_a_base() {
        return Err(StorageError::ConfigError(format!(
            "Base URL cannot carry a path: {}",
            base_url
        )));
    }
    Ok(base)
}

/// Recover the namespace segments and filename from a published URL.
///
/// Absolute URLs are accepted from any host; a path-only reference such as
/// `/Uploads/party/logo.webp` is resolved against `base`. When the URL shares
/// the base's origin, the base path is stripped first. Query and fragment are
/// ignored, and only the filename segment is percent-decoded.
pub fn parse_asset_url(url: &str, base: &Url, url_prefix: &str) -> StorageResult<AssetKey> {
    let raw = url.trim();
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => base
            .join(raw)
            .map_err(|e| StorageError::InvalidKey(format!("Invalid URL {:?}: {}", raw, e)))?,
        Err(e) => {
            return Err(StorageError::InvalidKey(format!(
                "Invalid URL {:?}: {}",
                raw, e
            )))
        }
    };

    let mut segments: Vec<&str> = parsed
        .path_segments()
        .ok_or_else(|| StorageError::InvalidKey(format!("URL has no path: {}", raw)))?
        .collect();

    if parsed.origin() == base.origin() {
        let base_segments: Vec<&str> = base
            .path_segments()
            .map(|s| s.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();
        if !base_segments.is_empty() && segments.starts_with(&base_segments) {
            segments.drain(..base_segments.len());
        }
    }

    if segments.first() != Some(&url_prefix) {
        return Err(StorageError::InvalidKey(format!(
            "URL is not under /{}/: {}",
            url_prefix, raw
        )));
    }
    segments.remove(0);

    let encoded_filename = segments.pop().unwrap_or("");
    if segments.is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "URL has no namespace: {}",
            raw
        )));
    }

    for segment in &segments {
        if segment.is_empty() || *segment == "." || *segment == ".." || segment.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "URL contains an invalid path segment: {}",
                raw
            )));
        }
    }

    let filename = percent_decode_str(encoded_filename)
        .decode_utf8()
        .map_err(|e| StorageError::InvalidKey(format!("Filename is not valid UTF-8: {}", e)))?
        .into_owned();

    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
    {
        return Err(StorageError::InvalidKey(format!(
            "URL contains an invalid filename: {}",
            raw
        )));
    }

    Ok(AssetKey {
        segments: segments.into_iter().map(String::from).collect(),
        filename,
    })
}
