use super::{CommandOutput, CommandRunner, Invocation, preserve_env_flag, shell_quote};
use crate::errors::{StackError, StackResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::Write;

/// Prints each command instead of running it.
///
/// Every command "succeeds". Commands whose output is consumed (such as
/// `losetup --show`) get `<program>` back as stdout, mirroring a `$(...)`
/// substitution in the printed plan.
pub struct DryRunRunner {
    use_sudo: bool,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl DryRunRunner {
    pub fn new(use_sudo: bool, sink: Box<dyn Write + Send>) -> Self {
        Self {
            use_sudo,
            sink: Mutex::new(sink),
        }
    }

    pub fn stdout(use_sudo: bool) -> Self {
        Self::new(use_sudo, Box::new(std::io::stdout()))
    }

    /// The line printed for `invocation`.
    pub fn render(&self, invocation: &Invocation) -> String {
        let mut line = String::new();
        for (key, _) in &invocation.env {
            line.push_str(key);
            line.push_str("=*** ");
        }
        if invocation.privileged && self.use_sudo {
            line.push_str("sudo ");
            if let Some(flag) = preserve_env_flag(invocation) {
                line.push_str(&flag);
                line.push(' ');
            }
        }
        line.push_str(&invocation.to_string());
        if let Some(input) = &invocation.stdin {
            line.push_str(" <<'EOF'\n");
            line.push_str(input.trim_end());
            line.push_str("\nEOF");
        }
        line
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation) -> StackResult<CommandOutput> {
        let line = self.render(invocation);
        tracing::debug!(command = %invocation, "dry-run");
        writeln!(self.sink.lock(), "{line}")
            .map_err(|e| StackError::Internal(format!("failed to write dry-run plan: {e}")))?;
        Ok(CommandOutput::success().with_stdout(format!(
            "<{}>",
            shell_quote(&invocation.program)
        )))
    }

    fn is_dry_run(&self) -> bool {
        true
    }

    fn note(&self, message: &str) {
        if let Err(e) = writeln!(self.sink.lock(), "# {message}") {
            tracing::warn!(error = %e, "failed to write dry-run note");
        }
    }
}
