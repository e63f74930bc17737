//! Settings file.
//!
//! Everything except secrets lives in an optional TOML file; a missing file
//! means defaults. Secrets come only from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use apkfetch_core::ThrottleSettings;
use apkfetch_core::backend::{MirrorSettings, StoreSettings};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Staging area for candidate builds.
    pub scratch_dir: Option<PathBuf>,
    pub output: OutputSection,
    pub throttle: ThrottleSection,
    pub store: StoreSettings,
    pub mirror: MirrorSection,
    pub inspector: InspectorSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThrottleSection {
    pub enabled: bool,
    pub threshold: u32,
    pub throttle_secs: u64,
    pub cooldown_secs: u64,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        let defaults = ThrottleSettings::default();
        Self {
            enabled: defaults.enabled,
            threshold: defaults.threshold,
            throttle_secs: defaults.throttle.as_secs(),
            cooldown_secs: defaults.cooldown.as_secs(),
        }
    }
}

impl From<&ThrottleSection> for ThrottleSettings {
    fn from(section: &ThrottleSection) -> Self {
        Self {
            enabled: section.enabled,
            threshold: section.threshold,
            throttle: Duration::from_secs(section.throttle_secs),
            cooldown: Duration::from_secs(section.cooldown_secs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MirrorSection {
    #[serde(flatten)]
    pub remote: MirrorSettings,
    /// Drop builds dated before the target level's release.
    pub filter_by_release_date: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InspectorSection {
    pub aapt: String,
}

impl Default for InspectorSection {
    fn default() -> Self {
        Self {
            aapt: "aapt".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `explicit`, else from the default location.
    ///
    /// An explicitly named file must exist; a missing default file yields
    /// the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match apkfetch_core::config_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// `--out` wins over the settings file, which wins over `./out`.
    pub fn output_root(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.output.root.clone())
            .unwrap_or_else(apkfetch_core::default_output_root)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(apkfetch_core::default_scratch_dir)
    }
}
