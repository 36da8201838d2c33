//! Hustings Storage Library
//!
//! Filesystem layout for stored media: namespace directories, public URLs and
//! URL-driven removal.
//!
//! # Layout
//!
//! Files live at `<storage-root>/<effective namespace>/<stem>.<ext>` and are
//! served at `<base-url>/<url-prefix>/<effective namespace>/<encoded filename>`.
//! Both derivations read [`hustings_core::Namespace::effective_segments`], and
//! URL parsing is centralized in the `keys` module, so the create side and the
//! delete side cannot drift apart.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{AssetStore, RemoveOutcome, StorageError, StorageResult};
