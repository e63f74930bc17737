//! `apkfetch summary`: per-category results from the ledger.

use std::path::Path;

use anyhow::{Result, bail};
use apkfetch_core::{Ledger, OutputLayout};
use crossterm::style::Stylize;

use crate::TargetArgs;
use crate::settings::Settings;
use crate::ui::table;

pub async fn summary(args: &TargetArgs, config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;
    let target = args.target();
    let layout = OutputLayout::new(settings.output_root(args.out.as_deref()));
    let path = layout.ledger_path(&target);

    if !path.is_file() {
        bail!("No ledger at {} (ledgers are kept for store runs)", path.display());
    }

    let records = Ledger::read_all(&path).await?;
    let counts = table::tally(&records);

    println!("{} {}", "Target".bold(), target);
    println!("{}", format!("{}", path.display()).dark_grey());
    println!("{}", table::render(&counts));
    Ok(())
}
