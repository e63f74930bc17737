//! apkfetch - fetch Android builds matching a target API level
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! Downloads one build per package from either an authenticated store or
//! an archive mirror. When a specific API level is requested, the build is
//! located by binary search over the package's version codes, inspecting
//! each candidate's manifest with `aapt`.
//!
//! # Output Layout
//!
//! ```text
//! out/
//! ├── latest/{category}/{package}.apk
//! ├── 27/{category}/{package}.apk        # at-least mode
//! └── 27_match/                          # exact mode
//!     ├── {category}/{package}.apk
//!     └── ledger.csv                     # store runs only
//! ```

pub mod catalog;
pub mod cmd;
pub mod settings;
pub mod ui;

pub use apkfetch_core::USER_AGENT;

use apkfetch_schema::{MatchMode, TargetLevel, TargetSpec};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "apkfetch")]
#[command(author, version, about = "apkfetch - fetch Android builds matching a target API level")]
pub struct Cli {
    /// Settings file (defaults to $APKFETCH_CONFIG or ~/.config/apkfetch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Authenticated store (credentials from APKFETCH_STORE_*)
    Store,
    /// Archive mirror (credentials from APKFETCH_MIRROR_*)
    Mirror,
}

/// Target selection shared by `fetch` and `summary`.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// API level to collect builds for, or `latest`
    #[arg(long, default_value = "latest")]
    pub level: TargetLevel,
    /// Require targetSdkVersion to equal the level instead of bracketing it
    #[arg(long)]
    pub exact: bool,
    /// Output root (defaults to [output] root in settings, else ./out)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl TargetArgs {
    pub fn target(&self) -> TargetSpec {
        let match_mode = if self.exact {
            MatchMode::Exact
        } else {
            MatchMode::AtLeast
        };
        TargetSpec {
            level: self.level,
            match_mode,
        }
    }
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Backend to download from
    #[arg(long, value_enum)]
    pub backend: BackendArg,
    #[command(flatten)]
    pub target: TargetArgs,
    /// Package list, one `package,category` per line
    #[arg(long)]
    pub list: PathBuf,
    /// Skip this many entries of the list
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Process at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
    /// Show every probe of the version search
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download builds for every package in a list
    Fetch(FetchArgs),
    /// Show per-category results recorded in the ledger
    Summary {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the API levels declared by build files
    Inspect {
        /// Build files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
