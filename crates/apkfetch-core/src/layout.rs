use std::path::{Path, PathBuf};

use apkfetch_schema::{MatchMode, PackageRequest, TargetLevel, TargetSpec};

/// File name of the attempt ledger inside a target directory.
pub const LEDGER_FILE_NAME: &str = "ledger.csv";

/// On-disk layout: `root/{level|latest}[_match]/{category}/{package}.apk`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name for a target; `_match` marks exact-mode runs.
    pub fn target_dir_name(target: &TargetSpec) -> String {
        match (target.level, target.match_mode) {
            (TargetLevel::Latest, _) => "latest".to_string(),
            (TargetLevel::Level(n), MatchMode::Exact) => format!("{n}_match"),
            (TargetLevel::Level(n), MatchMode::AtLeast) => n.to_string(),
        }
    }

    pub fn target_dir(&self, target: &TargetSpec) -> PathBuf {
        self.root.join(Self::target_dir_name(target))
    }

    pub fn destination(&self, target: &TargetSpec, request: &PackageRequest) -> PathBuf {
        self.target_dir(target)
            .join(&request.category)
            .join(request.id.artifact_file_name())
    }

    pub fn ledger_path(&self, target: &TargetSpec) -> PathBuf {
        self.target_dir(target).join(LEDGER_FILE_NAME)
    }
}
