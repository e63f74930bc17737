//! Line-oriented progress reporter.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use apkfetch_core::orchestrator::{PackageOutcome, RunSummary};
use apkfetch_core::throttle::Pause;
use apkfetch_core::Reporter;
use apkfetch_schema::{ApiLevelRange, PackageId, PackageRequest};
use crossterm::style::Stylize;

const NAME_WIDTH: usize = 44;

/// Prints one line per package to stdout; probe detail only when verbose.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    verbose: bool,
    position: AtomicUsize,
    total: AtomicUsize,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{text}").ok();
    }

    fn counter(&self) -> String {
        let total = self.total.load(Ordering::Relaxed);
        let width = total.to_string().len();
        format!(
            "[{:>width$}/{total}]",
            self.position.load(Ordering::Relaxed)
        )
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        self.line("");
        self.line(&title.bold().to_string());
    }

    fn started(&self, request: &PackageRequest, index: usize, total: usize) {
        self.position.store(index + 1, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        if self.verbose {
            self.line(&format!(
                "{} {} {}",
                self.counter().dark_grey(),
                request.id,
                format!("({})", request.category).dark_grey()
            ));
        }
    }

    fn probing(&self, _package: &PackageId, identifier: u64) {
        if self.verbose {
            self.line(&format!("      probe {identifier}").dark_grey().to_string());
        }
    }

    fn inspected(&self, _package: &PackageId, identifier: u64, range: &ApiLevelRange) {
        if self.verbose {
            let detail = if range.is_unreadable() {
                "unreadable manifest".to_string()
            } else {
                format!("min {} target {}", range.min, range.target)
            };
            self.line(&format!("      {identifier}: {detail}").dark_grey().to_string());
        }
    }

    fn finished(&self, request: &PackageRequest, outcome: &PackageOutcome) {
        let name = format!("{:<NAME_WIDTH$}", request.id.as_str());
        let (mark, detail) = match outcome {
            PackageOutcome::Found { identifier, .. } => (
                "✓".green(),
                identifier
                    .map(|id| format!("build {id}"))
                    .unwrap_or_default()
                    .green(),
            ),
            PackageOutcome::Skipped(reason) => ("-".dark_grey(), reason.to_string().dark_grey()),
            PackageOutcome::NotFound { .. } => (
                "✗".yellow(),
                outcome.error_text().unwrap_or_default().yellow(),
            ),
            PackageOutcome::Error { message } => ("✗".red(), message.clone().red()),
        };
        self.line(&format!("{} {mark} {name} {detail}", self.counter().dark_grey()));
    }

    fn paused(&self, pause: &Pause) {
        self.line(&format!("  ⏸ {pause}").cyan().to_string());
    }

    fn warning(&self, msg: &str) {
        self.line(&format!("{} {msg}", "warning:".yellow().bold()));
    }

    fn summary(&self, summary: &RunSummary, elapsed_secs: f64) {
        self.line("");
        self.line(&format!(
            "{} found, {} not found, {} errors, {} skipped {}",
            summary.found.to_string().green().bold(),
            summary.not_found.to_string().yellow(),
            summary.errors.to_string().red(),
            summary.skipped,
            format!("in {elapsed_secs:.1}s").dark_grey()
        ));
    }
}
