#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// A `stackctl` invocation confined to its own temporary home.
pub struct TestContext {
    pub cmd: Command,
    pub home: PathBuf,
    temp_dir: TempDir,
}

impl TestContext {
    pub fn new_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_stackctl");
        let mut cmd = Command::new(bin_path);
        cmd.timeout(Duration::from_secs(30));
        cmd.env("HOME", self.temp_dir.path())
            .env("STACKCTL_HOME", &self.home)
            .env_remove("STACKCTL_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write an options file into the temp dir and return its path.
    pub fn write_config(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write config file");
        path
    }
}

pub fn stackctl() -> TestContext {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let home = temp_dir.path().join("state");
    let mut ctx = TestContext {
        cmd: Command::new(env!("CARGO_BIN_EXE_stackctl")),
        home,
        temp_dir,
    };
    ctx.cmd = ctx.new_cmd();
    ctx
}

/// Plan lines that invoke `program`, with any `sudo` prefix removed.
pub fn plan_lines(stdout: &[u8], program: &str) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| l.strip_prefix("sudo ").unwrap_or(l))
        .filter(|l| l.starts_with(&format!("{program} ")))
        .map(str::to_string)
        .collect()
}
