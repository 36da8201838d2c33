//! Hustings Infrastructure Library
//!
//! Process-level concerns shared by the binaries.

pub mod telemetry;

pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
