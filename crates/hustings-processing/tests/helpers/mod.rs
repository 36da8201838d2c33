//! Test helpers for the processing integration tests.
//!
//! Run from workspace root: `cargo test -p hustings-processing`.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use std::path::Path;

/// Names of the entries in `dir`, sorted. Missing directory reads as empty.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let Ok(read) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = read
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
