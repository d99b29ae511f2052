//! Test helpers shared by the stackctl crates.
//!
//! [`RecordingRunner`] stands in for the host: it records every invocation
//! and answers with scripted output, so orchestration can be checked without
//! touching systemd, yum or LVM.

use async_trait::async_trait;
use parking_lot::Mutex;
use stackctl::errors::StackResult;
use stackctl::exec::{BoxedRunner, CommandOutput, CommandRunner, Invocation};
use stackctl::options::{Privilege, ReadinessPolicy, StackOptions};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Rule {
    program: String,
    args: Vec<String>,
    /// Served front to back; the last one repeats.
    outputs: VecDeque<CommandOutput>,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        invocation.matches(&self.program, &args)
    }

    fn next(&mut self) -> CommandOutput {
        if self.outputs.len() > 1 {
            self.outputs.pop_front().unwrap_or_default()
        } else {
            self.outputs.front().cloned().unwrap_or_default()
        }
    }
}

/// A fake host that remembers what it was asked to run.
///
/// Unscripted commands succeed with empty output. The most recently added
/// matching rule wins.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    notes: Mutex<Vec<String>>,
    rules: Mutex<Vec<Rule>>,
}

impl RecordingRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A host where the volume group does not exist yet and `losetup`
    /// hands out `/dev/loop0`.
    pub fn fresh_host() -> Arc<Self> {
        let runner = Self::new();
        runner.respond(
            "losetup",
            &["--show"],
            CommandOutput::success().with_stdout("/dev/loop0\n"),
        );
        runner.respond(
            "vgs",
            &[],
            CommandOutput::failure(5, "Volume group \"nova-volumes\" not found"),
        );
        runner
    }

    /// Answer `program args...` with `output` from now on.
    pub fn respond(&self, program: &str, args: &[&str], output: CommandOutput) {
        self.respond_sequence(program, args, vec![output]);
    }

    /// Answer successive matching calls with `outputs` in turn.
    pub fn respond_sequence(&self, program: &str, args: &[&str], outputs: Vec<CommandOutput>) {
        self.rules.lock().push(Rule {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            outputs: outputs.into(),
        });
    }

    /// Make `program args...` exit non-zero with `stderr`.
    pub fn fail(&self, program: &str, args: &[&str], stderr: &str) {
        self.respond(program, args, CommandOutput::failure(1, stderr));
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Every call rendered as a shell line.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.to_string()).collect()
    }

    pub fn calls_to(&self, program: &str, args: &[&str]) -> Vec<Invocation> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.matches(program, args))
            .cloned()
            .collect()
    }

    /// Index of the first call matching `program args...`.
    pub fn position(&self, program: &str, args: &[&str]) -> Option<usize> {
        self.calls.lock().iter().position(|c| c.matches(program, args))
    }

    /// Units passed to `systemctl <verb>`, in call order.
    pub fn units(&self, verb: &str) -> Vec<String> {
        self.calls_to("systemctl", &[verb])
            .into_iter()
            .filter_map(|c| c.args.get(1).cloned())
            .collect()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().clone()
    }

    pub fn as_runner(self: Arc<Self>) -> BoxedRunner {
        self
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> StackResult<CommandOutput> {
        self.calls.lock().push(invocation.clone());
        let mut rules = self.rules.lock();
        let output = rules
            .iter_mut()
            .rev()
            .find(|r| r.matches(invocation))
            .map(Rule::next)
            .unwrap_or_else(CommandOutput::success);
        Ok(output)
    }

    fn note(&self, message: &str) {
        self.notes.lock().push(message.to_string());
    }
}

/// Options confined to `dir`: no sudo, fast readiness polling.
pub fn test_options(dir: &Path) -> StackOptions {
    StackOptions {
        home_dir: dir.join("home"),
        credentials_path: dir.join("keystonerc"),
        readiness: ReadinessPolicy::Poll {
            interval_ms: 10,
            timeout_secs: 1,
        },
        privilege: Privilege::Never,
        ..Default::default()
    }
}

/// Isolated options plus the temp dir that backs them.
pub struct TestContext {
    pub options: StackOptions,
    pub runner: Arc<RecordingRunner>,
    _temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_runner(RecordingRunner::fresh_host())
    }

    pub fn with_runner(runner: Arc<RecordingRunner>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            options: test_options(temp_dir.path()),
            runner,
            _temp_dir: temp_dir,
        }
    }

    pub fn dir(&self) -> &Path {
        self._temp_dir.path()
    }

    pub fn orchestrator(&self) -> stackctl::Orchestrator {
        stackctl::Orchestrator::new(self.options.clone(), self.runner.clone().as_runner())
            .expect("test options are valid")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
