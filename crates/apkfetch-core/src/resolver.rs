//! Version resolution.
//!
//! Locates a build of a package whose declared API levels satisfy a
//! requested level by binary search over the backend's identifier space
//! `[0, latest]`. Two kinds of noise are tolerated:
//!
//! - probes that cannot be fetched at all are treated as a soft lower bound
//!   (`floor`) instead of failing the search;
//! - the declared target level is not strictly monotonic in identifier
//!   order, so the search converges on *some* satisfying build rather than
//!   the first one.
//!
//! The search itself is the pure [`transition`] function over a [`Cursor`].
//! [`VersionResolver`] drives it against a live backend and inspector and
//! owns candidate cleanup: every fetched build that does not end the search
//! as `Found` is deleted before the next probe.

use std::fmt;
use std::path::{Path, PathBuf};

use apkfetch_schema::{ApiLevelRange, MatchMode, PackageId, Verdict};

use crate::backend::Backend;
use crate::inspector::ManifestInspector;
use crate::io::discard;
use crate::reporter::Reporter;

/// Why a search ended without a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The backend could not report the newest identifier.
    NoVersionInfo,
    /// Without version information only the newest build was tried, and it
    /// does not satisfy the request.
    NewestUnsuitable,
    /// The search settled on a build that could not be fetched.
    Unobtainable { identifier: u64 },
    /// The search settled on a build that does not satisfy the request.
    NoMatch { identifier: u64 },
    /// A probed build has no readable API-level metadata.
    Unreadable { identifier: u64 },
    /// The probe ceiling was reached.
    ProbeBudgetExhausted { probes: u32 },
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVersionInfo => f.write_str("no version information available"),
            Self::NewestUnsuitable => {
                f.write_str("no version information; the newest build does not match")
            }
            Self::Unobtainable { identifier } => {
                write!(f, "build {identifier} could not be fetched")
            }
            Self::NoMatch { identifier } => {
                write!(f, "no matching build (search ended at {identifier})")
            }
            Self::Unreadable { identifier } => {
                write!(f, "build {identifier} has unreadable API-level metadata")
            }
            Self::ProbeBudgetExhausted { probes } => {
                write!(f, "gave up after {probes} probes")
            }
        }
    }
}

/// Bounds of an ongoing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    lo: u64,
    hi: u64,
    /// Last identifier known to fail fetching, cleared by a too-old probe.
    floor: Option<u64>,
    last_probed: Option<u64>,
}

/// What the cursor asks for next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Probe(u64),
    Halt(NotFoundReason),
}

impl Cursor {
    pub fn new(latest: u64) -> Self {
        Self {
            lo: 0,
            hi: latest,
            floor: None,
            last_probed: None,
        }
    }

    pub fn lo(&self) -> u64 {
        self.lo
    }

    pub fn hi(&self) -> u64 {
        self.hi
    }

    pub fn floor(&self) -> Option<u64> {
        self.floor
    }

    pub fn last_probed(&self) -> Option<u64> {
        self.last_probed
    }

    fn base(&self) -> u64 {
        self.floor.unwrap_or(self.lo)
    }

    /// Size of the interval the next probe is drawn from.
    pub fn width(&self) -> u64 {
        self.hi.saturating_sub(self.base())
    }

    /// Midpoint of the effective interval, or a halt when it would repeat
    /// the previous probe.
    pub fn next_probe(&self) -> Step {
        let probe = ceil_mid(self.base(), self.hi);
        if self.last_probed != Some(probe) {
            return Step::Probe(probe);
        }
        if self.floor == Some(probe) {
            Step::Halt(NotFoundReason::Unobtainable { identifier: probe })
        } else {
            Step::Halt(NotFoundReason::NoMatch { identifier: probe })
        }
    }
}

/// `ceil((a + b) / 2)` without overflow.
pub fn ceil_mid(a: u64, b: u64) -> u64 {
    a / 2 + b / 2 + (a % 2 + b % 2 + 1) / 2
}

/// Result of fetching and inspecting one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    FetchFailed,
    Unreadable,
    Levels(ApiLevelRange),
    Fatal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Searching(Cursor),
    Found { identifier: u64 },
    NotFound(NotFoundReason),
    Fatal(String),
}

/// Applies one observation at `probe` to `cursor`.
pub fn transition(
    mut cursor: Cursor,
    probe: u64,
    observation: Observation,
    requested: u32,
    mode: MatchMode,
) -> SearchState {
    cursor.last_probed = Some(probe);

    let range = match observation {
        Observation::Fatal(reason) => return SearchState::Fatal(reason),
        Observation::Unreadable => {
            return SearchState::NotFound(NotFoundReason::Unreadable { identifier: probe });
        }
        Observation::FetchFailed => {
            cursor.lo = probe;
            cursor.floor = Some(probe);
            return SearchState::Searching(cursor);
        }
        Observation::Levels(range) if range.is_unreadable() => {
            return SearchState::NotFound(NotFoundReason::Unreadable { identifier: probe });
        }
        Observation::Levels(range) => range,
    };

    match range.verdict(requested, mode) {
        Verdict::Match => return SearchState::Found { identifier: probe },
        Verdict::TooNew => {
            cursor.hi = probe;
            if let Some(floor) = cursor.floor {
                cursor.lo = ceil_mid(probe, floor);
            }
        }
        Verdict::TooOld => {
            cursor.lo = probe;
            cursor.floor = None;
        }
        // Neither bound moves; the next step repeats this probe and halts.
        Verdict::Inconsistent => {}
    }
    SearchState::Searching(cursor)
}

/// Hard ceiling on probes for a domain ending at `latest`.
pub fn probe_budget(latest: u64) -> u32 {
    let bits = u64::BITS - latest.leading_zeros();
    2 * bits + 4
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Found {
        /// `None` when the newest build was taken and the backend did not
        /// say which one it was.
        identifier: Option<u64>,
        path: PathBuf,
    },
    NotFound {
        reason: NotFoundReason,
        /// Message of the most recent fetch failure, unless a later fetch
        /// succeeded.
        last_error: Option<String>,
    },
    Fatal(String),
}

/// Drives the search for one package.
pub struct VersionResolver<'a> {
    backend: &'a dyn Backend,
    inspector: &'a dyn ManifestInspector,
    reporter: &'a dyn Reporter,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        inspector: &'a dyn ManifestInspector,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            backend,
            inspector,
            reporter,
        }
    }

    /// Searches for a build of `package` satisfying `requested` under `mode`,
    /// staging candidates in `staging`.
    ///
    /// On `Found` the accepted build is still in `staging`; every other
    /// candidate has been deleted. When the backend has no version
    /// information for `package`, the newest build is fetched instead and
    /// kept only if it satisfies the request.
    pub async fn resolve(
        &self,
        package: &PackageId,
        requested: u32,
        mode: MatchMode,
        staging: &Path,
    ) -> ResolutionOutcome {
        let latest = match self.backend.fetch_latest(package).await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                tracing::warn!("No version code for {}; trying the newest build", package);
                return self.accept_newest(package, requested, mode, staging).await;
            }
            Err(e) if e.is_fatal() => return ResolutionOutcome::Fatal(e.to_string()),
            Err(e) => {
                return ResolutionOutcome::NotFound {
                    reason: NotFoundReason::NoVersionInfo,
                    last_error: Some(e.to_string()),
                };
            }
        };

        let budget = probe_budget(latest);
        let mut cursor = Cursor::new(latest);
        let mut probes = 0u32;
        let mut last_error = None;
        tracing::debug!("Resolving {} over [0, {}]", package, latest);

        loop {
            let probe = match cursor.next_probe() {
                Step::Probe(probe) => probe,
                Step::Halt(reason) => return ResolutionOutcome::NotFound { reason, last_error },
            };
            if probes >= budget {
                tracing::warn!("Probe budget exhausted for {}", package);
                return ResolutionOutcome::NotFound {
                    reason: NotFoundReason::ProbeBudgetExhausted { probes },
                    last_error,
                };
            }
            probes += 1;
            self.reporter.probing(package, probe);

            let (observation, candidate) =
                match self.backend.fetch_artifact(package, Some(probe), staging).await {
                    Ok(candidate) => {
                        last_error = None;
                        let range = self.inspector.inspect(&candidate.path).await;
                        self.reporter.inspected(package, probe, &range);
                        tracing::debug!("{} #{}: {}", package, probe, range);
                        let observation = if range.is_unreadable() {
                            tracing::warn!("Unreadable manifest in {} build {}", package, probe);
                            Observation::Unreadable
                        } else {
                            Observation::Levels(range)
                        };
                        (observation, Some(candidate.path))
                    }
                    Err(e) if e.is_fatal() => (Observation::Fatal(e.to_string()), None),
                    Err(e) => {
                        tracing::debug!("{} #{}: fetch failed: {}", package, probe, e);
                        last_error = Some(e.to_string());
                        (Observation::FetchFailed, None)
                    }
                };

            let state = transition(cursor, probe, observation, requested, mode);
            if let (SearchState::Found { identifier }, Some(path)) = (&state, &candidate) {
                return ResolutionOutcome::Found {
                    identifier: Some(*identifier),
                    path: path.clone(),
                };
            }
            if let Some(path) = &candidate {
                discard(path).await;
            }

            match state {
                SearchState::Searching(next) => cursor = next,
                SearchState::NotFound(reason) => {
                    return ResolutionOutcome::NotFound { reason, last_error };
                }
                SearchState::Fatal(reason) => return ResolutionOutcome::Fatal(reason),
                // Found without a candidate cannot happen: a match needs levels.
                SearchState::Found { identifier } => {
                    return ResolutionOutcome::NotFound {
                        reason: NotFoundReason::Unobtainable { identifier },
                        last_error,
                    };
                }
            }
        }
    }

    async fn accept_newest(
        &self,
        package: &PackageId,
        requested: u32,
        mode: MatchMode,
        staging: &Path,
    ) -> ResolutionOutcome {
        let candidate = match self.backend.fetch_artifact(package, None, staging).await {
            Ok(candidate) => candidate,
            Err(e) if e.is_fatal() => return ResolutionOutcome::Fatal(e.to_string()),
            Err(e) => {
                return ResolutionOutcome::NotFound {
                    reason: NotFoundReason::NoVersionInfo,
                    last_error: Some(e.to_string()),
                };
            }
        };

        let range = self.inspector.inspect(&candidate.path).await;
        if let Some(identifier) = candidate.identifier {
            self.reporter.inspected(package, identifier, &range);
        }
        if !range.is_unreadable() && range.verdict(requested, mode) == Verdict::Match {
            return ResolutionOutcome::Found {
                identifier: candidate.identifier,
                path: candidate.path,
            };
        }

        discard(&candidate.path).await;
        ResolutionOutcome::NotFound {
            reason: NotFoundReason::NewestUnsuitable,
            last_error: None,
        }
    }
}
