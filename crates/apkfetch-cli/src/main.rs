//! apkfetch - fetch Android builds matching a target API level

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apkfetch_cli::cmd;
use apkfetch_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("apkfetch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Fetch(args) => cmd::fetch::fetch(&args, config).await,
        Commands::Summary { target } => cmd::summary::summary(&target, config).await,
        Commands::Inspect { files } => cmd::inspect::inspect(&files, config).await,
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
