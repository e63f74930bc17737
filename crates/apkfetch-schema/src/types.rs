//! Package identity and the unit of work handed to the orchestrator.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::path::PathBuf;

/// An application package identifier (e.g. `com.example.app`).
///
/// Store identifiers are case-sensitive, so unlike most names in this
/// workspace the value is kept exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(String);

impl PackageId {
    /// Create a package identifier, trimming surrounding whitespace.
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_string())
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this package's artifact (`{id}.apk`).
    pub fn artifact_file_name(&self) -> String {
        format!("{}.{}", self.0, crate::ARTIFACT_EXTENSION)
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PackageId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageId {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl PartialEq<&str> for PackageId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A store category label (e.g. `TOOLS`, `GAME_PUZZLE`).
///
/// Used verbatim as a directory name in the output layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Create a category label, trimming surrounding whitespace.
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_string())
    }

    /// Return the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<std::path::Path> for Category {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One `(package, category)` pair from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    /// Package to fetch.
    pub id: PackageId,
    /// Category directory the artifact is filed under.
    pub category: Category,
}

impl PackageRequest {
    /// Build a request from its two parts.
    pub fn new(id: impl Into<PackageId>, category: impl Into<Category>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
        }
    }
}

/// A build that has been fetched to disk but not yet accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    /// Identifier (version code) of the build, when the backend reported one.
    pub identifier: Option<u64>,
    /// Where the candidate currently lives.
    pub path: PathBuf,
}
