//! Namespace parsing and the nested-entity `images` policy.
//!
//! A namespace is the slash-delimited logical path a file belongs to, e.g.
//! `party` or `voters/jane_doe`. Namespaces under a nested prefix implicitly
//! gain a trailing `images` segment. That decision is taken once, in
//! [`NamespaceRules::parse`], and carried on the [`Namespace`] value so the
//! directory side and the URL side both read it from
//! [`Namespace::effective_segments`].

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::{DEFAULT_NESTED_PREFIX, IMAGES_SEGMENT};
use crate::error::MediaError;

/// How a namespace maps onto directories below the storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespacePolicy {
    /// The literal segments are the directory; nothing is pruned on eviction.
    Flat,
    /// `<prefix>/<entity...>/images`; everything below the prefix is entity-owned.
    NestedWithImagesSuffix,
}

/// Parsed, validated namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    segments: Vec<String>,
    policy: NamespacePolicy,
}

impl Namespace {
    pub fn policy(&self) -> NamespacePolicy {
        self.policy
    }

    /// Caller-visible segments, without the implicit suffix.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments used for both the directory and the public URL.
    pub fn effective_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        if self.policy == NamespacePolicy::NestedWithImagesSuffix {
            segments.push(IMAGES_SEGMENT);
        }
        segments
    }

    /// `effective_segments` joined with `/`.
    pub fn effective_path(&self) -> String {
        self.effective_segments().join("/")
    }

    /// First segment; the directory shared by every entity of this kind.
    pub fn shared_root(&self) -> &str {
        &self.segments[0]
    }

    /// Number of directories below the shared root that eviction may prune.
    pub fn entity_owned_depth(&self) -> usize {
        match self.policy {
            NamespacePolicy::Flat => 0,
            NamespacePolicy::NestedWithImagesSuffix => self.effective_segments().len() - 1,
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Which namespace prefixes use [`NamespacePolicy::NestedWithImagesSuffix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRules {
    nested_prefixes: Vec<String>,
}

impl Default for NamespaceRules {
    fn default() -> Self {
        Self {
            nested_prefixes: vec![DEFAULT_NESTED_PREFIX.to_string()],
        }
    }
}

impl NamespaceRules {
    /// Prefixes are single segments; a trailing `/` is tolerated (`voters/`).
    pub fn new<I, S>(nested_prefixes: I) -> Result<Self, MediaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes = Vec::new();
        for prefix in nested_prefixes {
            let prefix = prefix.as_ref().trim().trim_end_matches('/');
            if prefix.is_empty() {
                continue;
            }
            validate_segment(prefix)?;
            prefixes.push(prefix.to_string());
        }
        Ok(Self {
            nested_prefixes: prefixes,
        })
    }

    pub fn nested_prefixes(&self) -> &[String] {
        &self.nested_prefixes
    }

    /// Validate `raw` and attach its policy.
    ///
    /// For nested namespaces a trailing `images` segment supplied by the
    /// caller is folded into the policy, so `voters/jane_doe` and
    /// `voters/jane_doe/images` are the same namespace.
    pub fn parse(&self, raw: &str) -> Result<Namespace, MediaError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(MediaError::InvalidInput("namespace must not be empty".into()));
        }
        if raw.starts_with('/') {
            return Err(MediaError::InvalidInput(format!(
                "namespace must be relative: {}",
                raw
            )));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }

        let nested = segments.len() >= 2 && self.nested_prefixes.contains(&segments[0]);
        let policy = if nested {
            if segments.len() >= 3 && segments.last().map(String::as_str) == Some(IMAGES_SEGMENT)
            {
                segments.pop();
            }
            NamespacePolicy::NestedWithImagesSuffix
        } else {
            NamespacePolicy::Flat
        };

        Ok(Namespace { segments, policy })
    }

    /// `<prefix>/<sanitized name>` for a per-entity folder.
    pub fn for_entity(&self, prefix: &str, name: &str) -> Result<Namespace, MediaError> {
        let entity = sanitize_segment(name);
        if entity.is_empty() {
            return Err(MediaError::InvalidInput("entity name must not be empty".into()));
        }
        self.parse(&format!("{}/{}", prefix.trim_end_matches('/'), entity))
    }
}

/// Folder name for a business identifier: non-alphanumerics become `_`, lowercased.
pub fn sanitize_segment(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Characters a URL path carries without percent-encoding.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_graphic()
        && !matches!(
            c,
            '\\' | '?' | '#' | '%' | '"' | '<' | '>' | '`' | '{' | '}' | '^' | '|'
        )
}

fn validate_segment(segment: &str) -> Result<(), MediaError> {
    if segment.is_empty() {
        return Err(MediaError::InvalidInput(
            "namespace contains an empty segment".into(),
        ));
    }
    if segment == "." || segment == ".." {
        return Err(MediaError::InvalidInput(format!(
            "namespace segment not allowed: {}",
            segment
        )));
    }
    if !segment.chars().all(is_url_safe) {
        return Err(MediaError::InvalidInput(format!(
            "namespace segment contains invalid characters: {:?}",
            segment
        )));
    }
    Ok(())
}
