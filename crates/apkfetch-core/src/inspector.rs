//! Reading declared API levels out of a build.
//!
//! The core never parses a binary manifest itself. It asks a
//! [`ManifestInspector`], which must answer with
//! [`ApiLevelRange::UNREADABLE`] rather than fail.

use std::path::{Path, PathBuf};

use apkfetch_schema::ApiLevelRange;
use async_trait::async_trait;
use regex::Regex;

use crate::config::ConfigError;

#[async_trait]
pub trait ManifestInspector: Send + Sync {
    async fn inspect(&self, artifact: &Path) -> ApiLevelRange;
}

/// Inspector backed by `aapt dump badging`.
#[derive(Debug, Clone)]
pub struct AaptInspector {
    program: PathBuf,
}

impl AaptInspector {
    /// Resolves `program` (a name on `PATH` or a path) to an executable.
    pub fn locate(program: &str) -> Result<Self, ConfigError> {
        let program = which::which(program).map_err(|e| {
            ConfigError::invalid("inspector.aapt", format!("cannot find `{program}`: {e}"))
        })?;
        Ok(Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl ManifestInspector for AaptInspector {
    async fn inspect(&self, artifact: &Path) -> ApiLevelRange {
        let output = tokio::process::Command::new(&self.program)
            .arg("dump")
            .arg("badging")
            .arg(artifact)
            .output()
            .await;

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(out) => {
                tracing::warn!(
                    "aapt exited with {} for {}",
                    out.status,
                    artifact.display()
                );
                return ApiLevelRange::UNREADABLE;
            }
            Err(e) => {
                tracing::warn!("Failed to run {}: {e}", self.program.display());
                return ApiLevelRange::UNREADABLE;
            }
        };

        match String::from_utf8(output.stdout) {
            Ok(text) => parse_badging(&text),
            Err(_) => ApiLevelRange::UNREADABLE,
        }
    }
}

/// Extracts `sdkVersion` and `targetSdkVersion` from `aapt dump badging`
/// output. A missing field is reported as `-1`.
///
/// ```
/// use apkfetch_core::inspector::parse_badging;
///
/// let out = "package: name='a.b'\nsdkVersion:'21'\ntargetSdkVersion:'28'\n";
/// let range = parse_badging(out);
/// assert_eq!((range.min, range.target), (21, 28));
/// ```
pub fn parse_badging(output: &str) -> ApiLevelRange {
    let min = badging_field(output, "sdkVersion").unwrap_or(-1);
    let target = badging_field(output, "targetSdkVersion").unwrap_or(-1);
    ApiLevelRange::new(min, target)
}

fn badging_field(output: &str, key: &str) -> Option<i32> {
    let re = Regex::new(&format!(r"(?m)^\s*{key}:'(\d+)'")).ok()?;
    re.captures(output)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BADGING: &str = "\
package: name='com.example.app' versionCode='57' versionName='2.1'
sdkVersion:'19'
targetSdkVersion:'27'
uses-permission: name='android.permission.INTERNET'
application-label:'Example'
";

    #[test]
    fn test_parse_badging() {
        assert_eq!(parse_badging(BADGING), ApiLevelRange::new(19, 27));
    }

    #[test]
    fn test_missing_target_is_unreadable() {
        let range = parse_badging("package: name='a'\nsdkVersion:'9'\n");
        assert_eq!(range, ApiLevelRange::new(9, -1));
        assert!(range.is_unreadable());
        assert!(parse_badging("").is_unreadable());
    }

    #[test]
    fn test_sdk_version_does_not_match_target_line() {
        // `targetSdkVersion` must not be read as `sdkVersion`
        let range = parse_badging("targetSdkVersion:'30'\n");
        assert_eq!(range, ApiLevelRange::new(-1, 30));
    }

    #[test]
    fn test_locate_unknown_program() {
        let err = AaptInspector::locate("apkfetch-no-such-aapt-binary").unwrap_err();
        assert!(err.to_string().contains("inspector.aapt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_inspect_runs_program() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-aapt");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf \"sdkVersion:'16'\\ntargetSdkVersion:'23'\\n\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let inspector = AaptInspector::locate(script.to_str().unwrap()).unwrap();
        let range = inspector.inspect(&dir.path().join("x.apk")).await;
        assert_eq!(range, ApiLevelRange::new(16, 23));

        let failing = dir.path().join("failing-aapt");
        std::fs::write(&failing, "#!/bin/sh\nexit 1\n").unwrap();
        std::fs::set_permissions(&failing, std::fs::Permissions::from_mode(0o755)).unwrap();
        let inspector = AaptInspector::locate(failing.to_str().unwrap()).unwrap();
        assert!(inspector.inspect(&dir.path().join("x.apk")).await.is_unreadable());
    }
}
