pub mod backend;
pub mod config;
pub mod context;
pub mod inspector;
pub mod io;
pub mod layout;
pub mod ledger;
pub mod orchestrator;
pub mod paths;
pub mod resolver;
pub mod throttle;

pub mod reporter;

pub use backend::{Backend, BackendError, BackendKind, MirrorClient, StoreClient};
pub use config::ConfigError;
pub use context::RunContext;
pub use inspector::{AaptInspector, ManifestInspector};
pub use layout::OutputLayout;
pub use ledger::{Ledger, LedgerError};
pub use orchestrator::{Orchestrator, PackageOutcome, RunError, RunSummary, SkipReason};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use resolver::{NotFoundReason, ResolutionOutcome, VersionResolver};
pub use throttle::{Pause, RateLimiter, ThrottleSettings, TokioSleeper};

/// User Agent string for backend requests
pub const USER_AGENT: &str = concat!("apkfetch/", env!("CARGO_PKG_VERSION"));
