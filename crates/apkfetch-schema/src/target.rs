//! Resolution goals and the API-level metadata they are checked against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The API level a run is collecting builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetLevel {
    /// Whatever the backend currently serves; no search is performed.
    Latest,
    /// A specific platform API level (e.g. `30`).
    Level(u32),
}

impl TargetLevel {
    /// The numeric level, or `None` for [`TargetLevel::Latest`].
    pub fn level(self) -> Option<u32> {
        match self {
            Self::Latest => None,
            Self::Level(n) => Some(n),
        }
    }
}

impl fmt::Display for TargetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Level(n) => write!(f, "{n}"),
        }
    }
}

/// Errors produced when parsing a [`TargetLevel`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TargetParseError {
    /// The value was neither `latest` nor a non-negative integer.
    #[error("invalid API level '{0}': expected a number or 'latest'")]
    InvalidLevel(String),
}

impl FromStr for TargetLevel {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        s.parse::<u32>()
            .map(Self::Level)
            .map_err(|_| TargetParseError::InvalidLevel(s.to_string()))
    }
}

/// How a build's declared levels are compared with the requested level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// The build's `targetSdkVersion` must equal the requested level.
    Exact,
    /// The requested level must lie within `[minSdkVersion, targetSdkVersion]`.
    #[default]
    AtLeast,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::AtLeast => f.write_str("at-least"),
        }
    }
}

/// The resolution goal for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSpec {
    /// Level to collect builds for.
    pub level: TargetLevel,
    /// Comparison rule; irrelevant when `level` is [`TargetLevel::Latest`].
    pub match_mode: MatchMode,
}

impl TargetSpec {
    /// Target the latest build of every package.
    pub fn latest() -> Self {
        Self {
            level: TargetLevel::Latest,
            match_mode: MatchMode::AtLeast,
        }
    }

    /// Target a specific level with the given comparison rule.
    pub fn level(level: u32, match_mode: MatchMode) -> Self {
        Self {
            level: TargetLevel::Level(level),
            match_mode,
        }
    }

    /// Whether this spec asks for the latest build.
    pub fn is_latest(&self) -> bool {
        self.level == TargetLevel::Latest
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            TargetLevel::Latest => f.write_str("latest"),
            TargetLevel::Level(n) => write!(f, "{n} ({})", self.match_mode),
        }
    }
}

/// How a build's declared levels relate to a requested level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The build satisfies the request.
    Match,
    /// The build targets a newer level than requested.
    TooNew,
    /// The build targets an older level than requested.
    TooOld,
    /// Neither a match nor ordered relative to the request
    /// (a `minSdkVersion` above a matching `targetSdkVersion`).
    Inconsistent,
}

/// `minSdkVersion` / `targetSdkVersion` as declared in a build's manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiLevelRange {
    /// Declared `minSdkVersion`, `-1` when absent.
    pub min: i32,
    /// Declared `targetSdkVersion`, `-1` when absent.
    pub target: i32,
}

impl ApiLevelRange {
    /// Sentinel returned when a manifest cannot be read.
    pub const UNREADABLE: Self = Self {
        min: -1,
        target: -1,
    };

    /// Build a range from its two bounds.
    pub const fn new(min: i32, target: i32) -> Self {
        Self { min, target }
    }

    /// Whether either field is missing.
    pub fn is_unreadable(&self) -> bool {
        self.min == -1 || self.target == -1
    }

    /// Compare this build against `requested` under `mode`.
    pub fn verdict(&self, requested: u32, mode: MatchMode) -> Verdict {
        let requested = i64::from(requested);
        let min = i64::from(self.min);
        let target = i64::from(self.target);

        let matched = match mode {
            MatchMode::Exact => target == requested,
            MatchMode::AtLeast => min <= requested && requested <= target,
        };

        if matched {
            Verdict::Match
        } else if target > requested {
            Verdict::TooNew
        } else if target < requested {
            Verdict::TooOld
        } else {
            Verdict::Inconsistent
        }
    }
}

impl fmt::Display for ApiLevelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minSdkVersion: {}, targetSdkVersion: {}", self.min, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_level() {
        assert_eq!("latest".parse::<TargetLevel>(), Ok(TargetLevel::Latest));
        assert_eq!("LATEST".parse::<TargetLevel>(), Ok(TargetLevel::Latest));
        assert_eq!(" 27 ".parse::<TargetLevel>(), Ok(TargetLevel::Level(27)));
        assert!("-3".parse::<TargetLevel>().is_err());
        assert!("thirty".parse::<TargetLevel>().is_err());
    }

    #[test]
    fn test_target_level_display_round_trips() {
        assert_eq!(TargetLevel::Level(30).to_string(), "30");
        assert_eq!(TargetLevel::Latest.to_string(), "latest");
    }

    #[test]
    fn test_exact_verdict() {
        let range = ApiLevelRange::new(16, 28);
        assert_eq!(range.verdict(28, MatchMode::Exact), Verdict::Match);
        assert_eq!(range.verdict(27, MatchMode::Exact), Verdict::TooNew);
        assert_eq!(range.verdict(29, MatchMode::Exact), Verdict::TooOld);
    }

    #[test]
    fn test_at_least_verdict() {
        let range = ApiLevelRange::new(21, 28);
        assert_eq!(range.verdict(21, MatchMode::AtLeast), Verdict::Match);
        assert_eq!(range.verdict(25, MatchMode::AtLeast), Verdict::Match);
        assert_eq!(range.verdict(28, MatchMode::AtLeast), Verdict::Match);
        assert_eq!(range.verdict(19, MatchMode::AtLeast), Verdict::TooNew);
        assert_eq!(range.verdict(30, MatchMode::AtLeast), Verdict::TooOld);
    }

    #[test]
    fn test_inconsistent_manifest() {
        // minSdkVersion above targetSdkVersion never matches in at-least mode
        let range = ApiLevelRange::new(30, 26);
        assert_eq!(range.verdict(26, MatchMode::AtLeast), Verdict::Inconsistent);
    }

    #[test]
    fn test_unreadable_sentinel() {
        assert!(ApiLevelRange::UNREADABLE.is_unreadable());
        assert!(ApiLevelRange::new(21, -1).is_unreadable());
        assert!(!ApiLevelRange::new(21, 30).is_unreadable());
    }
}
