//! `apkfetch inspect`: print declared API levels.

use std::path::{Path, PathBuf};

use anyhow::Result;
use apkfetch_core::{AaptInspector, ManifestInspector};
use crossterm::style::Stylize;

use crate::settings::Settings;

pub async fn inspect(files: &[PathBuf], config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;
    let inspector = AaptInspector::locate(&settings.inspector.aapt)?;

    for file in files {
        let range = inspector.inspect(file).await;
        let detail = if range.is_unreadable() {
            "unreadable".red().to_string()
        } else {
            format!("min {:>2}  target {:>2}", range.min, range.target)
        };
        println!("{}  {detail}", file.display());
    }
    Ok(())
}
