use super::{CommandOutput, CommandRunner, Invocation, preserve_env_flag};
use crate::errors::{StackError, StackResult};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs commands on this host.
///
/// Privileged invocations are prefixed with `sudo` when `use_sudo` is set.
/// Their environment goes to sudo's own environment and is kept across the
/// privilege switch with `--preserve-env`, so values never appear in argv.
#[derive(Debug)]
pub struct HostRunner {
    use_sudo: bool,
    counter: AtomicU64,
}

impl HostRunner {
    pub fn new(use_sudo: bool) -> Self {
        Self {
            use_sudo,
            counter: AtomicU64::new(0),
        }
    }

    fn build(&self, invocation: &Invocation) -> Command {
        let mut cmd = if invocation.privileged && self.use_sudo {
            let mut cmd = Command::new("sudo");
            if let Some(flag) = preserve_env_flag(invocation) {
                cmd.arg(flag);
            }
            cmd.arg(&invocation.program);
            cmd
        } else {
            Command::new(&invocation.program)
        };

        cmd.envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, invocation: &Invocation) -> StackResult<CommandOutput> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            id,
            command = %invocation,
            sudo = invocation.privileged && self.use_sudo,
            "running command"
        );
        if !invocation.env.is_empty() {
            let keys: Vec<&str> = invocation.env.iter().map(|(k, _)| k.as_str()).collect();
            tracing::debug!(id, envs = ?keys, "command environment");
        }

        let spawn_err = |source| StackError::Spawn {
            command: invocation.to_string(),
            source,
        };

        let mut child = self.build(invocation).spawn().map_err(spawn_err)?;

        if let Some(input) = &invocation.stdin
            && let Some(mut stdin) = child.stdin.take()
        {
            stdin.write_all(input.as_bytes()).await.map_err(spawn_err)?;
            // Close stdin so the program sees EOF.
            drop(stdin);
        }

        let output = child.wait_with_output().await.map_err(spawn_err)?;
        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::info!(
            id,
            result = if result.is_success() { "OK" } else { "ERROR" },
            status = result
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string()),
            "finished command"
        );
        if !result.stdout.is_empty() {
            tracing::debug!(id, stdout = %result.stdout.trim_end(), "command stdout");
        }
        if !result.stderr.is_empty() {
            tracing::debug!(id, stderr = %result.stderr.trim_end(), "command stderr");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[tokio::test]
    async fn captures_stdout_and_status() {
        let runner = HostRunner::new(false);
        let out = runner
            .run(&Invocation::new("sh").args(["-c", "echo hello; exit 3"]))
            .await
            .unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "hello\n");
        assert!(!out.is_success());
    }

    #[tokio::test]
    async fn feeds_stdin() {
        let runner = HostRunner::new(false);
        let out = runner
            .check(&Invocation::new("cat").stdin("DROP DATABASE nova;\n"))
            .await
            .unwrap();
        assert_eq!(out.stdout, "DROP DATABASE nova;\n");
    }

    #[tokio::test]
    async fn passes_environment() {
        let runner = HostRunner::new(false);
        let out = runner
            .check(
                &Invocation::new("sh")
                    .args(["-c", "printf %s \"$OS_USERNAME\""])
                    .env("OS_USERNAME", "admin"),
            )
            .await
            .unwrap();
        assert_eq!(out.stdout, "admin");
    }

    #[test]
    fn sudo_keeps_env_values_out_of_argv() {
        let runner = HostRunner::new(true);
        let cmd = runner.build(
            &Invocation::privileged("openstack-keystone-sample-data")
                .env("ADMIN_PASSWORD", "verybadpass")
                .env("ADMIN_TOKEN", "feedface"),
        );
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "sudo");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(
            args,
            ["--preserve-env=ADMIN_PASSWORD,ADMIN_TOKEN", "openstack-keystone-sample-data"]
        );
        let envs: Vec<_> = std_cmd.get_envs().collect();
        let password = (OsStr::new("ADMIN_PASSWORD"), Some(OsStr::new("verybadpass")));
        assert!(envs.contains(&password));
    }

    #[test]
    fn sudo_without_env_has_no_preserve_flag() {
        let runner = HostRunner::new(true);
        let cmd = runner.build(&Invocation::privileged("systemctl").args(["start", "mysqld"]));
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(args, ["systemctl", "start", "mysqld"]);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let runner = HostRunner::new(false);
        let err = runner
            .run(&Invocation::new("stackctl-no-such-program"))
            .await
            .unwrap_err();
        assert!(matches!(err, StackError::Spawn { .. }));
    }

    #[tokio::test]
    async fn check_reports_failure() {
        let runner = HostRunner::new(false);
        let err = runner
            .check(&Invocation::new("sh").args(["-c", "echo boom >&2; exit 1"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
