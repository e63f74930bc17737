//! Reporter trait for dependency injection
//!
//! Lets the orchestrator and resolver report progress without being coupled
//! to a terminal. The CLI renders these events; tests use [`NullReporter`].

use apkfetch_schema::{ApiLevelRange, PackageId, PackageRequest};

use crate::orchestrator::{PackageOutcome, RunSummary};
use crate::throttle::Pause;

pub trait Reporter: Send + Sync {
    /// A batch is about to start (e.g. "Fetching 120 packages for level 27").
    fn section(&self, title: &str);

    /// Work on one package begins. `index` is zero-based.
    fn started(&self, request: &PackageRequest, index: usize, total: usize);

    /// The resolver is about to fetch `identifier`.
    fn probing(&self, package: &PackageId, identifier: u64);

    /// A probed build was inspected.
    fn inspected(&self, package: &PackageId, identifier: u64, range: &ApiLevelRange);

    /// Work on one package ended.
    fn finished(&self, request: &PackageRequest, outcome: &PackageOutcome);

    /// The run is sleeping before the next package.
    fn paused(&self, pause: &Pause);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Display the totals of a finished run.
    fn summary(&self, summary: &RunSummary, elapsed_secs: f64);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title)
    }
    fn started(&self, request: &PackageRequest, index: usize, total: usize) {
        (**self).started(request, index, total)
    }
    fn probing(&self, package: &PackageId, identifier: u64) {
        (**self).probing(package, identifier)
    }
    fn inspected(&self, package: &PackageId, identifier: u64, range: &ApiLevelRange) {
        (**self).inspected(package, identifier, range)
    }
    fn finished(&self, request: &PackageRequest, outcome: &PackageOutcome) {
        (**self).finished(request, outcome)
    }
    fn paused(&self, pause: &Pause) {
        (**self).paused(pause)
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg)
    }
    fn summary(&self, summary: &RunSummary, elapsed_secs: f64) {
        (**self).summary(summary, elapsed_secs)
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn started(&self, _: &PackageRequest, _: usize, _: usize) {}
    fn probing(&self, _: &PackageId, _: u64) {}
    fn inspected(&self, _: &PackageId, _: u64, _: &ApiLevelRange) {}
    fn finished(&self, _: &PackageRequest, _: &PackageOutcome) {}
    fn paused(&self, _: &Pause) {}
    fn warning(&self, _: &str) {}
    fn summary(&self, _: &RunSummary, _: f64) {}
}
