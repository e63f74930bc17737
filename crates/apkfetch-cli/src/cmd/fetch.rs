//! `apkfetch fetch`: download one build per listed package.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use apkfetch_core::backend::{
    Backend, MirrorClient, MirrorCredentials, StoreClient, StoreCredentials,
};
use apkfetch_core::io::ScratchDir;
use apkfetch_core::{AaptInspector, Ledger, Orchestrator, OutputLayout, RunContext, ThrottleSettings};
use apkfetch_schema::{TargetSpec, release_date};

use crate::settings::Settings;
use crate::ui::ConsoleReporter;
use crate::{BackendArg, FetchArgs, catalog};

pub async fn fetch(args: &FetchArgs, config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;
    let target = args.target.target();

    let all = catalog::read(&args.list)?;
    let requests = catalog::window(&all, args.offset, args.limit);
    if requests.is_empty() {
        bail!("No packages to fetch in {}", args.list.display());
    }

    // Configuration is settled before the first network request
    let credentials = Credentials::from_env(args.backend)?;
    let inspector = AaptInspector::locate(&settings.inspector.aapt)?;
    tracing::debug!("Using {}", inspector.program().display());
    let backend = connect(credentials, &settings, &target).await?;

    let layout = OutputLayout::new(settings.output_root(args.target.out.as_deref()));
    let reporter = Arc::new(ConsoleReporter::new(args.verbose));
    let mut ctx = RunContext::new(backend, Box::new(inspector)).with_reporter(reporter);

    if args.backend == BackendArg::Store {
        let path = layout.ledger_path(&target);
        let ledger = Ledger::open(&path)
            .await
            .with_context(|| format!("Failed to open ledger {}", path.display()))?;
        tracing::info!("Ledger {} holds {} attempt(s)", path.display(), ledger.len());
        ctx = ctx.with_ledger(ledger);
    }

    let mut orchestrator = Orchestrator::new(
        ctx,
        target,
        layout,
        ScratchDir::new(settings.scratch_dir()),
        ThrottleSettings::from(&settings.throttle),
    );
    orchestrator.fetch_all(requests).await?;
    Ok(())
}

enum Credentials {
    Store(StoreCredentials),
    Mirror(MirrorCredentials),
}

impl Credentials {
    fn from_env(kind: BackendArg) -> Result<Self> {
        Ok(match kind {
            BackendArg::Store => Self::Store(StoreCredentials::from_env()?),
            BackendArg::Mirror => Self::Mirror(MirrorCredentials::from_env()?),
        })
    }
}

async fn connect(
    credentials: Credentials,
    settings: &Settings,
    target: &TargetSpec,
) -> Result<Box<dyn Backend>> {
    match credentials {
        Credentials::Store(credentials) => {
            let client = StoreClient::connect(&credentials, settings.store.clone())
                .await
                .context("Store login failed")?;
            Ok(Box::new(client))
        }
        Credentials::Mirror(credentials) => {
            let mut mirror = settings.mirror.remote.clone();
            if settings.mirror.filter_by_release_date {
                mirror.since = target.level.level().and_then(release_date);
            }
            Ok(Box::new(MirrorClient::open(credentials, mirror)?))
        }
    }
}
