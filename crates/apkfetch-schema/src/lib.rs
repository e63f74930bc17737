//! Shared domain types for apkfetch.
//!
//! These types are the vocabulary exchanged between the resolution engine
//! (`apkfetch-core`) and the command-line front end (`apkfetch-cli`).

pub mod record;
pub mod release;
pub mod target;
pub mod types;

// Re-exports
pub use record::*;
pub use release::release_date;
pub use target::*;
pub use types::*;

/// File extension of every stored artifact.
pub const ARTIFACT_EXTENSION: &str = "apk";
