//! End-to-end checks of the `apkfetch` binary.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const SECRET_KEYS: [&str; 6] = [
    "APKFETCH_STORE_EMAIL",
    "APKFETCH_STORE_PASSWORD",
    "APKFETCH_STORE_GSF_ID",
    "APKFETCH_STORE_AUTH_TOKEN",
    "APKFETCH_MIRROR_API_KEY",
    "APKFETCH_MIRROR_INDEX",
];

/// Isolated working directory with no settings file and no secrets.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dir");
        }
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_apkfetch"));
        cmd.current_dir(self.path());
        cmd.env("APKFETCH_CONFIG", self.path().join("absent.toml"));
        cmd.env("RUST_LOG", "off");
        for key in SECRET_KEYS {
            cmd.env_remove(key);
        }
        cmd
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.cmd().arg("--help").output().expect("failed to run apkfetch");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("fetch"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.cmd().arg("--version").output().expect("failed to run apkfetch");
    assert!(output.status.success());
}

#[test]
fn test_missing_store_credentials_are_listed() {
    let ctx = TestContext::new();
    ctx.write("apps.txt", "com.example.app,TOOLS\n");

    let output = ctx
        .cmd()
        .args(["fetch", "--backend", "store", "--level", "27", "--list", "apps.txt"])
        .env("APKFETCH_STORE_EMAIL", "dev@example.com")
        .output()
        .expect("failed to run apkfetch");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("APKFETCH_STORE_PASSWORD"), "{stderr}");
    assert!(stderr.contains("APKFETCH_STORE_GSF_ID"));
    assert!(stderr.contains("APKFETCH_STORE_AUTH_TOKEN"));
    assert!(!stderr.contains(" - APKFETCH_STORE_EMAIL"));
    assert!(!ctx.path().join("out").exists());
}

#[test]
fn test_missing_mirror_credentials_are_listed() {
    let ctx = TestContext::new();
    ctx.write("apps.txt", "com.example.app,TOOLS\n");

    let output = ctx
        .cmd()
        .args(["fetch", "--backend", "mirror", "--list", "apps.txt"])
        .output()
        .expect("failed to run apkfetch");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("APKFETCH_MIRROR_API_KEY"));
    assert!(stderr.contains("APKFETCH_MIRROR_INDEX"));
}

#[test]
fn test_summary_reads_ledger() {
    let ctx = TestContext::new();
    ctx.write(
        "out/27_match/ledger.csv",
        "package,category,result,error,identifier\n\
         com.a,TOOLS,found,,4120\n\
         com.b,TOOLS,not-found,no matching build (search ended at 12),\n\
         com.c,GAME,error,\"HTTP 500: boom, retry\",\n",
    );

    let output = ctx
        .cmd()
        .args(["summary", "--level", "27", "--exact"])
        .output()
        .expect("failed to run apkfetch");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TOOLS"));
    assert!(stdout.contains("GAME"));
    assert!(stdout.contains("50%"));
}

#[test]
fn test_summary_without_ledger_fails() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .args(["summary", "--level", "30"])
        .output()
        .expect("failed to run apkfetch");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No ledger"));
}

#[test]
fn test_completions() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .args(["completions", "bash"])
        .output()
        .expect("failed to run apkfetch");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("apkfetch"));
}

#[cfg(unix)]
#[test]
fn test_inspect_uses_configured_aapt() {
    use std::os::unix::fs::PermissionsExt;

    let ctx = TestContext::new();
    let aapt = ctx.write(
        "bin/aapt",
        "#!/bin/sh\nprintf \"package: name='a'\\nsdkVersion:'21'\\ntargetSdkVersion:'29'\\n\"\n",
    );
    std::fs::set_permissions(&aapt, std::fs::Permissions::from_mode(0o755)).unwrap();
    let config = ctx.write(
        "settings.toml",
        &format!("[inspector]\naapt = \"{}\"\n", aapt.display()),
    );
    ctx.write("app.apk", "not really a zip");

    let output = ctx
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["inspect", "app.apk"])
        .output()
        .expect("failed to run apkfetch");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("min 21"));
    assert!(stdout.contains("target 29"));
}
