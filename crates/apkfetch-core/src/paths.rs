use std::path::PathBuf;

/// Settings file location: `$APKFETCH_CONFIG`, else `~/.config/apkfetch/config.toml`.
///
/// Returns `None` if neither the override nor a config directory is available.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("APKFETCH_CONFIG") {
        return Some(PathBuf::from(val));
    }
    dirs::config_dir().map(|d| d.join("apkfetch").join("config.toml"))
}

/// Default output root, relative to the working directory.
pub fn default_output_root() -> PathBuf {
    PathBuf::from("out")
}

/// Default scratch directory for staging candidate builds.
pub fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".apkfetch-scratch")
}
