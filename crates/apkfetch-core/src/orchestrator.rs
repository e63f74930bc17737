//! Per-package download driver.
//!
//! For every request: skip if the artifact is already on disk (or, with a
//! ledger, already attempted); otherwise fetch the newest build directly or
//! run the [`VersionResolver`], promote an accepted build to its place in
//! the output tree, record the attempt and apply rate limiting. Packages are
//! processed strictly one at a time.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use apkfetch_schema::{LedgerRecord, LedgerResult, PackageId, PackageRequest, TargetLevel, TargetSpec};
use thiserror::Error;

use crate::backend::BackendError;
use crate::context::RunContext;
use crate::io::{ScratchDir, promote};
use crate::layout::OutputLayout;
use crate::resolver::{ResolutionOutcome, VersionResolver};
use crate::throttle::{RateLimiter, ThrottleSettings, signals_overload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyDownloaded,
    AlreadyAttempted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDownloaded => f.write_str("already downloaded"),
            Self::AlreadyAttempted => f.write_str("already attempted"),
        }
    }
}

/// How one package ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    Skipped(SkipReason),
    Found {
        identifier: Option<u64>,
        path: PathBuf,
    },
    NotFound {
        reason: String,
        last_error: Option<String>,
    },
    Error {
        message: String,
    },
}

impl PackageOutcome {
    /// Failure text worth recording or scanning for overload, if any.
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Skipped(_) | Self::Found { .. } => None,
            Self::NotFound {
                reason,
                last_error: Some(last),
            } => Some(format!("{reason} (last error: {last})")),
            Self::NotFound { reason, .. } => Some(reason.clone()),
            Self::Error { message } => Some(message.clone()),
        }
    }

    fn signals_overload(&self) -> bool {
        match self {
            Self::NotFound {
                last_error: Some(last),
                ..
            } => signals_overload(last),
            Self::Error { message } => signals_overload(message),
            _ => false,
        }
    }

    fn ledger_record(&self, request: &PackageRequest) -> Option<LedgerRecord> {
        let (result, identifier) = match self {
            Self::Skipped(_) => return None,
            Self::Found { identifier, .. } => (LedgerResult::Found, *identifier),
            Self::NotFound { .. } => (LedgerResult::NotFound, None),
            Self::Error { .. } => (LedgerResult::Error, None),
        };
        Some(LedgerRecord {
            package: request.id.clone(),
            category: request.category.clone(),
            result,
            error: self.error_text().unwrap_or_default(),
            identifier,
        })
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: usize,
    pub found: usize,
    pub not_found: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &PackageOutcome) {
        match outcome {
            PackageOutcome::Skipped(_) => self.skipped += 1,
            PackageOutcome::Found { .. } => self.found += 1,
            PackageOutcome::NotFound { .. } => self.not_found += 1,
            PackageOutcome::Error { .. } => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.skipped + self.found + self.not_found + self.errors
    }
}

/// The one way a run ends early: missing or rejected configuration.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("aborting run at {package}: {reason}")]
    Fatal { package: PackageId, reason: String },
}

pub struct Orchestrator {
    ctx: RunContext,
    target: TargetSpec,
    layout: OutputLayout,
    scratch: ScratchDir,
    limiter: RateLimiter,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("target", &self.target)
            .field("layout", &self.layout)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        ctx: RunContext,
        target: TargetSpec,
        layout: OutputLayout,
        scratch: ScratchDir,
        throttle: ThrottleSettings,
    ) -> Self {
        Self {
            ctx,
            target,
            layout,
            scratch,
            limiter: RateLimiter::new(throttle),
        }
    }

    /// Processes every request in order.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal condition (missing configuration);
    /// packages after it are not touched. Every other failure stays with its
    /// package.
    pub async fn fetch_all(&mut self, requests: &[PackageRequest]) -> Result<RunSummary, RunError> {
        let start = Instant::now();
        let mut summary = RunSummary::default();
        self.ctx.reporter.section(&format!(
            "Fetching {} package(s) from {} for target {}",
            requests.len(),
            self.ctx.backend.kind(),
            self.target
        ));

        for (index, request) in requests.iter().enumerate() {
            self.ctx.reporter.started(request, index, requests.len());
            let outcome = self.fetch_one(request).await?;
            summary.record(&outcome);
        }

        self.ctx
            .reporter
            .summary(&summary, start.elapsed().as_secs_f64());
        Ok(summary)
    }

    /// Processes one request, including any pause due afterwards.
    pub async fn fetch_one(&mut self, request: &PackageRequest) -> Result<PackageOutcome, RunError> {
        let dest = self.layout.destination(&self.target, request);

        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            return Ok(self.skip(request, SkipReason::AlreadyDownloaded));
        }
        if self.ctx.ledger.as_ref().is_some_and(|l| l.contains(&request.id)) {
            return Ok(self.skip(request, SkipReason::AlreadyAttempted));
        }

        let attempt = match self.scratch.prepare().await {
            Ok(()) => self.attempt(request, &dest).await,
            Err(e) => Ok(PackageOutcome::Error {
                message: format!("cannot prepare scratch directory: {e}"),
            }),
        };
        if let Err(e) = self.scratch.clear().await {
            let msg = format!("failed to clear {}: {e}", self.scratch.path().display());
            tracing::warn!("{msg}");
            self.ctx.reporter.warning(&msg);
        }
        let outcome = attempt?;

        match &outcome {
            PackageOutcome::Found { .. } => tracing::info!("{}: found", request.id),
            other => tracing::info!(
                "{}: {}",
                request.id,
                other.error_text().unwrap_or_default()
            ),
        }

        if let Some(ledger) = self.ctx.ledger.as_mut() {
            if let Some(record) = outcome.ledger_record(request) {
                if let Err(e) = ledger.append(&record).await {
                    let msg = format!("{}: attempt not recorded: {e}", request.id);
                    tracing::warn!("{msg}");
                    self.ctx.reporter.warning(&msg);
                }
            }
        }
        self.ctx.reporter.finished(request, &outcome);

        if let Some(pause) = self.limiter.record_attempt(outcome.signals_overload()) {
            tracing::info!("Pausing: {pause}");
            self.ctx.reporter.paused(&pause);
            self.ctx.sleeper.sleep(pause.duration).await;
        }

        Ok(outcome)
    }

    fn skip(&self, request: &PackageRequest, reason: SkipReason) -> PackageOutcome {
        tracing::debug!("{}: skipped ({reason})", request.id);
        let outcome = PackageOutcome::Skipped(reason);
        self.ctx.reporter.finished(request, &outcome);
        outcome
    }

    async fn attempt(&self, request: &PackageRequest, dest: &Path) -> Result<PackageOutcome, RunError> {
        let fatal = |reason: String| RunError::Fatal {
            package: request.id.clone(),
            reason,
        };

        let (identifier, staged) = match self.target.level {
            TargetLevel::Latest => {
                match self
                    .ctx
                    .backend
                    .fetch_artifact(&request.id, None, self.scratch.path())
                    .await
                {
                    Ok(candidate) => (candidate.identifier, candidate.path),
                    Err(e) if e.is_fatal() => return Err(fatal(e.to_string())),
                    Err(e) => return Ok(error_outcome(&e)),
                }
            }
            TargetLevel::Level(level) => {
                let resolver = VersionResolver::new(
                    self.ctx.backend.as_ref(),
                    self.ctx.inspector.as_ref(),
                    self.ctx.reporter.as_ref(),
                );
                match resolver
                    .resolve(&request.id, level, self.target.match_mode, self.scratch.path())
                    .await
                {
                    ResolutionOutcome::Found { identifier, path } => (identifier, path),
                    ResolutionOutcome::NotFound { reason, last_error } => {
                        return Ok(PackageOutcome::NotFound {
                            reason: reason.to_string(),
                            last_error,
                        });
                    }
                    ResolutionOutcome::Fatal(reason) => return Err(fatal(reason)),
                }
            }
        };

        match promote(&staged, dest).await {
            Ok(()) => Ok(PackageOutcome::Found {
                identifier,
                path: dest.to_path_buf(),
            }),
            Err(e) => Ok(PackageOutcome::Error {
                message: format!("cannot move build to {}: {e}", dest.display()),
            }),
        }
    }
}

fn error_outcome(e: &BackendError) -> PackageOutcome {
    PackageOutcome::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendKind};
    use crate::config::ConfigError;
    use crate::inspector::ManifestInspector;
    use crate::ledger::Ledger;
    use crate::reporter::Reporter;
    use crate::throttle::Sleeper;
    use apkfetch_schema::{ApiLevelRange, ArtifactCandidate, MatchMode};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Log = Arc<Mutex<Vec<String>>>;

    #[derive(Clone, Copy)]
    enum Failure {
        Busy,
        /// Refused for one package only.
        Denied(&'static str),
        MissingConfig,
    }

    /// Serves build `id` as a file containing `id`; `target_sdk(id) = id / 2`.
    struct FakeBackend {
        log: Log,
        latest: Option<u64>,
        failure: Option<Failure>,
    }

    #[async_trait]
    impl Backend for FakeBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Store
        }

        async fn fetch_latest(&self, package: &PackageId) -> Result<Option<u64>, BackendError> {
            self.log.lock().unwrap().push(format!("latest {package}"));
            Ok(self.latest)
        }

        async fn fetch_artifact(
            &self,
            package: &PackageId,
            identifier: Option<u64>,
            staging: &Path,
        ) -> Result<ArtifactCandidate, BackendError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("fetch {package} {identifier:?}"));
            match self.failure {
                Some(Failure::Busy) => {
                    return Err(BackendError::Busy {
                        status: 429,
                        message: "Too many requests".into(),
                    });
                }
                Some(Failure::Denied(denied)) if package.as_str() == denied => {
                    return Err(BackendError::Forbidden {
                        status: 403,
                        message: "item not available in your country".into(),
                    });
                }
                Some(Failure::MissingConfig) => {
                    return Err(ConfigError::Missing(vec!["APKFETCH_STORE_AUTH_TOKEN".into()]).into());
                }
                Some(Failure::Denied(_)) | None => {}
            }
            let id = identifier.or(self.latest).unwrap_or_default();
            let path = staging.join(format!("{package}-{id}.apk"));
            std::fs::write(&path, id.to_string()).unwrap();
            Ok(ArtifactCandidate {
                identifier: Some(id),
                path,
            })
        }
    }

    struct HalfInspector;

    #[async_trait]
    impl ManifestInspector for HalfInspector {
        async fn inspect(&self, artifact: &Path) -> ApiLevelRange {
            let id: i32 = std::fs::read_to_string(artifact).unwrap().parse().unwrap();
            ApiLevelRange::new(1, id / 2)
        }
    }

    struct RecordingSleeper(Log);

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.0
                .lock()
                .unwrap()
                .push(format!("sleep {}", duration.as_secs()));
        }
    }

    #[derive(Default)]
    struct WarningLog(Mutex<Vec<String>>);

    impl Reporter for WarningLog {
        fn section(&self, _: &str) {}
        fn started(&self, _: &PackageRequest, _: usize, _: usize) {}
        fn probing(&self, _: &PackageId, _: u64) {}
        fn inspected(&self, _: &PackageId, _: u64, _: &ApiLevelRange) {}
        fn finished(&self, _: &PackageRequest, _: &PackageOutcome) {}
        fn paused(&self, _: &crate::throttle::Pause) {}
        fn warning(&self, msg: &str) {
            self.0.lock().unwrap().push(msg.to_string());
        }
        fn summary(&self, _: &RunSummary, _: f64) {}
    }

    struct Harness {
        log: Log,
        root: tempfile::TempDir,
        orchestrator: Orchestrator,
    }

    impl Harness {
        fn new(target: TargetSpec, failure: Option<Failure>, throttle: ThrottleSettings) -> Self {
            let log: Log = Arc::default();
            let root = tempfile::tempdir().unwrap();
            let backend = FakeBackend {
                log: Arc::clone(&log),
                latest: Some(100),
                failure,
            };
            let ctx = RunContext::new(Box::new(backend), Box::new(HalfInspector))
                .with_sleeper(Box::new(RecordingSleeper(Arc::clone(&log))));
            let orchestrator = Orchestrator::new(
                ctx,
                target,
                OutputLayout::new(root.path().join("out")),
                ScratchDir::new(root.path().join("scratch")),
                throttle,
            );
            Self {
                log,
                root,
                orchestrator,
            }
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn scratch_is_clean(&self) -> bool {
            let scratch = self.root.path().join("scratch");
            !scratch.exists() || std::fs::read_dir(scratch).unwrap().next().is_none()
        }
    }

    fn exact(level: u32) -> TargetSpec {
        TargetSpec::level(level, MatchMode::Exact)
    }

    #[tokio::test]
    async fn test_existing_destination_is_skipped_without_calls() {
        let target = TargetSpec::level(27, MatchMode::AtLeast);
        let mut h = Harness::new(target, None, ThrottleSettings::default());
        let existing = h.root.path().join("out/27/Tools/app.apk");
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"old").unwrap();

        let outcome = h
            .orchestrator
            .fetch_one(&PackageRequest::new("app", "Tools"))
            .await
            .unwrap();

        assert_eq!(outcome, PackageOutcome::Skipped(SkipReason::AlreadyDownloaded));
        assert!(h.log().is_empty());
        assert_eq!(std::fs::read(&existing).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let mut h = Harness::new(exact(21), None, ThrottleSettings::default());
        let request = PackageRequest::new("com.example.app", "TOOLS");

        let first = h.orchestrator.fetch_one(&request).await.unwrap();
        let dest = h.root.path().join("out/21_match/TOOLS/com.example.app.apk");
        assert_eq!(
            first,
            PackageOutcome::Found {
                identifier: Some(43),
                path: dest.clone()
            }
        );
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "43");
        assert!(h.scratch_is_clean());

        let calls = h.log().len();
        let second = h.orchestrator.fetch_one(&request).await.unwrap();
        assert_eq!(second, PackageOutcome::Skipped(SkipReason::AlreadyDownloaded));
        assert_eq!(h.log().len(), calls);
    }

    #[tokio::test]
    async fn test_latest_target_fetches_directly() {
        let mut h = Harness::new(TargetSpec::latest(), None, ThrottleSettings::default());

        let outcome = h
            .orchestrator
            .fetch_one(&PackageRequest::new("com.a", "GAME"))
            .await
            .unwrap();

        assert!(matches!(outcome, PackageOutcome::Found { identifier: Some(100), .. }));
        assert_eq!(h.log(), vec!["fetch com.a None"]);
        assert!(h.root.path().join("out/latest/GAME/com.a.apk").exists());
    }

    #[tokio::test]
    async fn test_unmatched_level_leaves_no_files() {
        // Target levels only reach 50 in [0, 100]
        let mut h = Harness::new(exact(60), None, ThrottleSettings::default());

        let outcome = h
            .orchestrator
            .fetch_one(&PackageRequest::new("com.a", "GAME"))
            .await
            .unwrap();

        assert!(matches!(outcome, PackageOutcome::NotFound { .. }));
        assert!(h.scratch_is_clean());
        assert!(!h.root.path().join("out/60_match/GAME/com.a.apk").exists());
    }

    #[tokio::test]
    async fn test_periodic_throttle_between_attempts() {
        let throttle = ThrottleSettings {
            threshold: 5,
            ..ThrottleSettings::default()
        };
        let mut h = Harness::new(TargetSpec::latest(), None, throttle);
        let requests: Vec<PackageRequest> = (1..=12)
            .map(|i| PackageRequest::new(format!("com.p{i}"), "GAME"))
            .collect();

        let summary = h.orchestrator.fetch_all(&requests).await.unwrap();
        assert_eq!(summary.found, 12);

        let log = h.log();
        let sleeps: Vec<usize> = log
            .iter()
            .enumerate()
            .filter(|(_, e)| e.starts_with("sleep"))
            .map(|(i, _)| i)
            .collect();
        // After the 5th and 10th fetch, before the next one starts
        assert_eq!(sleeps, vec![5, 11]);
        assert_eq!(log[5], "sleep 60");
        assert_eq!(log[6], "fetch com.p6 None");
    }

    #[tokio::test]
    async fn test_overload_triggers_cooldown() {
        let throttle = ThrottleSettings {
            threshold: 5,
            ..ThrottleSettings::default()
        };
        let mut h = Harness::new(TargetSpec::latest(), Some(Failure::Busy), throttle);

        let outcome = h
            .orchestrator
            .fetch_one(&PackageRequest::new("com.a", "GAME"))
            .await
            .unwrap();

        let PackageOutcome::Error { message } = outcome else {
            panic!("expected an error outcome");
        };
        assert!(message.contains("server busy"));
        assert_eq!(h.log(), vec!["fetch com.a None", "sleep 600"]);
    }

    #[tokio::test]
    async fn test_overload_during_search_triggers_cooldown() {
        let mut h = Harness::new(exact(21), Some(Failure::Busy), ThrottleSettings::default());

        let outcome = h
            .orchestrator
            .fetch_one(&PackageRequest::new("com.a", "GAME"))
            .await
            .unwrap();

        assert!(matches!(outcome, PackageOutcome::NotFound { last_error: Some(_), .. }));
        assert_eq!(h.log().last().map(String::as_str), Some("sleep 600"));
        assert!(h.scratch_is_clean());
    }

    #[tokio::test]
    async fn test_denied_package_does_not_stop_batch() {
        let mut h = Harness::new(
            TargetSpec::latest(),
            Some(Failure::Denied("com.restricted")),
            ThrottleSettings::default(),
        );
        let requests = vec![
            PackageRequest::new("com.restricted", "GAME"),
            PackageRequest::new("com.ok", "GAME"),
        ];

        let summary = h.orchestrator.fetch_all(&requests).await.unwrap();

        assert_eq!(summary.errors, 1);
        assert_eq!(summary.found, 1);
        assert_eq!(h.log(), vec!["fetch com.restricted None", "fetch com.ok None"]);
        assert!(h.root.path().join("out/latest/GAME/com.ok.apk").exists());
        assert!(!h.root.path().join("out/latest/GAME/com.restricted.apk").exists());
    }

    #[tokio::test]
    async fn test_denied_package_during_search_is_not_found() {
        let mut h = Harness::new(
            exact(21),
            Some(Failure::Denied("com.restricted")),
            ThrottleSettings::default(),
        );

        let outcome = h
            .orchestrator
            .fetch_one(&PackageRequest::new("com.restricted", "GAME"))
            .await
            .unwrap();

        let PackageOutcome::NotFound { last_error, .. } = outcome else {
            panic!("expected not found, got {outcome:?}");
        };
        assert!(last_error.unwrap().contains("not available in your country"));
        assert!(h.scratch_is_clean());
    }

    #[tokio::test]
    async fn test_missing_configuration_aborts_run() {
        let mut h = Harness::new(
            TargetSpec::latest(),
            Some(Failure::MissingConfig),
            ThrottleSettings::default(),
        );
        let requests = vec![
            PackageRequest::new("com.a", "GAME"),
            PackageRequest::new("com.b", "GAME"),
        ];

        let err = h.orchestrator.fetch_all(&requests).await.unwrap_err();

        assert!(matches!(err, RunError::Fatal { ref package, .. } if *package == "com.a"));
        assert_eq!(h.log(), vec!["fetch com.a None"]);
        assert!(h.scratch_is_clean());
    }

    #[tokio::test]
    async fn test_ledger_records_attempts_and_skips_them() {
        let root = tempfile::tempdir().unwrap();
        let ledger_path = root.path().join("out/21_match/ledger.csv");
        let mut ledger = Ledger::open(&ledger_path).await.unwrap();
        ledger
            .append(&LedgerRecord {
                package: PackageId::new("com.done"),
                category: "GAME".into(),
                result: LedgerResult::NotFound,
                error: "no matching build".into(),
                identifier: None,
            })
            .await
            .unwrap();

        let log: Log = Arc::default();
        let backend = FakeBackend {
            log: Arc::clone(&log),
            latest: Some(100),
            failure: None,
        };
        let ctx = RunContext::new(Box::new(backend), Box::new(HalfInspector))
            .with_ledger(ledger)
            .with_sleeper(Box::new(RecordingSleeper(Arc::clone(&log))));
        let mut orchestrator = Orchestrator::new(
            ctx,
            exact(21),
            OutputLayout::new(root.path().join("out")),
            ScratchDir::new(root.path().join("scratch")),
            ThrottleSettings::default(),
        );

        let summary = orchestrator
            .fetch_all(&[
                PackageRequest::new("com.done", "GAME"),
                PackageRequest::new("com.new", "GAME"),
            ])
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.found, 1);
        assert!(log.lock().unwrap().iter().all(|e| !e.contains("com.done")));

        let records = Ledger::read_all(&ledger_path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].package, PackageId::new("com.new"));
        assert_eq!(records[1].result, LedgerResult::Found);
        assert_eq!(records[1].identifier, Some(43));
    }

    #[tokio::test]
    async fn test_ledger_write_failure_is_a_warning() {
        let root = tempfile::tempdir().unwrap();
        let ledger_path = root.path().join("out/21_match/ledger.csv");
        let ledger = Ledger::open(&ledger_path).await.unwrap();
        // Appends never recreate the file
        std::fs::remove_file(&ledger_path).unwrap();

        let log: Log = Arc::default();
        let backend = FakeBackend {
            log: Arc::clone(&log),
            latest: Some(100),
            failure: None,
        };
        let reporter = Arc::new(WarningLog::default());
        let ctx = RunContext::new(Box::new(backend), Box::new(HalfInspector))
            .with_ledger(ledger)
            .with_reporter(Arc::clone(&reporter) as Arc<dyn Reporter>)
            .with_sleeper(Box::new(RecordingSleeper(Arc::clone(&log))));
        let mut orchestrator = Orchestrator::new(
            ctx,
            exact(21),
            OutputLayout::new(root.path().join("out")),
            ScratchDir::new(root.path().join("scratch")),
            ThrottleSettings::default(),
        );
        let requests = [
            PackageRequest::new("com.a", "GAME"),
            PackageRequest::new("com.b", "GAME"),
        ];

        let summary = orchestrator.fetch_all(&requests).await.unwrap();
        assert_eq!(summary.found, 2);
        let warnings = reporter.0.lock().unwrap().clone();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("com.a: attempt not recorded"));

        // The builds on disk still make a rerun skip them
        let again = orchestrator.fetch_all(&requests).await.unwrap();
        assert_eq!(again.skipped, 2);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&PackageOutcome::Skipped(SkipReason::AlreadyAttempted));
        summary.record(&PackageOutcome::Error {
            message: "x".into(),
        });
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.errors, 1);
    }
}
