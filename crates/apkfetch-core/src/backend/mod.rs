//! Artifact backends.
//!
//! A [`Backend`] knows how to find the newest identifier (version code) of a
//! package and how to fetch one build into a staging directory. Two
//! implementations exist:
//!
//! - [`StoreClient`]: an authenticated store, logged in once at construction.
//! - [`MirrorClient`]: a crowd-sourced archive addressed through a local
//!   dataset index and an API key.
//!
//! The resolver and orchestrator only ever see `dyn Backend`.

use std::fmt;
use std::path::Path;

use apkfetch_schema::{ArtifactCandidate, PackageId};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::io::download::DownloadError;

pub mod mirror;
pub mod store;

pub use mirror::{MirrorClient, MirrorCredentials, MirrorSettings};
pub use store::{StoreClient, StoreCredentials, StoreSettings};

/// Which backend variant is active for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Store,
    Mirror,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => f.write_str("store"),
            Self::Mirror => f.write_str("mirror"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("credentials rejected: {0}")]
    Unauthorized(String),

    /// The session was refused one request. Unlike [`Self::Unauthorized`]
    /// this only concerns the package asked for.
    #[error("access denied (HTTP {status}): {message}")]
    Forbidden { status: u16, message: String },

    #[error("server busy (HTTP {status}): {message}")]
    Busy { status: u16, message: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("no build {identifier} of {package}")]
    Unavailable { package: PackageId, identifier: u64 },

    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl BackendError {
    /// Fatal errors end the whole run: the configuration is missing or the
    /// backend refuses the credentials it was given.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Unauthorized(_))
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Identifier of the newest build, or `None` if the backend knows no
    /// builds of `package`.
    async fn fetch_latest(&self, package: &PackageId) -> Result<Option<u64>, BackendError>;

    /// Fetch one build into `staging`. `None` asks for the newest build.
    ///
    /// Any error other than a fatal one is a fetch failure for that
    /// identifier; the resolver treats it as a soft lower bound.
    async fn fetch_artifact(
        &self,
        package: &PackageId,
        identifier: Option<u64>,
        staging: &Path,
    ) -> Result<ArtifactCandidate, BackendError>;
}

/// Staging file name for one candidate of `package`.
pub(crate) fn candidate_file_name(package: &PackageId, identifier: Option<u64>) -> String {
    match identifier {
        Some(id) => format!("{package}-{id}.{}", apkfetch_schema::ARTIFACT_EXTENSION),
        None => format!("{package}-latest.{}", apkfetch_schema::ARTIFACT_EXTENSION),
    }
}
