//! Required configuration and the fatal error raised when it is absent.

use thiserror::Error;

/// Configuration problems. Every variant is fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration, please set:\n - {}", .0.join("\n - "))]
    Missing(Vec<String>),

    #[error("invalid configuration for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Looks up every key in `keys`, reporting all missing ones at once.
///
/// Blank values count as missing.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] listing every key `lookup` could not
/// resolve.
///
/// # Example
///
/// ```
/// use apkfetch_core::config::require;
///
/// let env = |k: &str| (k == "A").then(|| "1".to_string());
/// assert_eq!(require(["A"], env).unwrap(), ["1".to_string()]);
/// assert!(require(["A", "B"], env).is_err());
/// ```
pub fn require<const N: usize>(
    keys: [&str; N],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<[String; N], ConfigError> {
    let mut found = Vec::with_capacity(N);
    let mut missing = Vec::new();

    for key in keys {
        match lookup(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => found.push(value),
            None => missing.push(key.to_string()),
        }
    }

    <[String; N]>::try_from(found).map_err(|_| ConfigError::Missing(missing))
}
