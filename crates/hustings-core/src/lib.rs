//! Hustings Core Library
//!
//! Configuration, the error taxonomy, media families and the namespace policy
//! shared by the storage and processing crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod namespace;

// Re-export commonly used types
pub use config::{Config, PipelineConfig};
pub use error::{LogLevel, MediaError};
pub use media::{canonical_filename, normalize_content_type, timestamped_stem, MediaFamily};
pub use namespace::{sanitize_segment, Namespace, NamespacePolicy, NamespaceRules};
