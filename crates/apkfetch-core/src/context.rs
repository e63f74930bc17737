//! Per-run context.
//!
//! Groups the collaborators one batch run needs: the authenticated backend
//! session, the inspector, the ledger handle and the progress sinks. Built
//! once before the first package and dropped when the run ends.

use std::fmt;
use std::sync::Arc;

use crate::backend::Backend;
use crate::inspector::ManifestInspector;
use crate::ledger::Ledger;
use crate::reporter::{NullReporter, Reporter};
use crate::throttle::{Sleeper, TokioSleeper};

pub struct RunContext {
    pub backend: Box<dyn Backend>,
    pub inspector: Box<dyn ManifestInspector>,
    pub ledger: Option<Ledger>,
    pub reporter: Arc<dyn Reporter>,
    pub sleeper: Box<dyn Sleeper>,
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("backend", &self.backend.kind())
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl RunContext {
    /// A context with no ledger, a silent reporter and real sleeps.
    pub fn new(backend: Box<dyn Backend>, inspector: Box<dyn ManifestInspector>) -> Self {
        Self {
            backend,
            inspector,
            ledger: None,
            reporter: Arc::new(NullReporter),
            sleeper: Box::new(TokioSleeper),
        }
    }

    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}
