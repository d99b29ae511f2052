//! Error types for stackctl.
//!
//! Every external command is a distinct fallible step. Errors carry enough of
//! the failing command to be actionable without re-running it.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by orchestration steps.
#[derive(Debug, Error)]
pub enum StackError {
    /// The program could not be started at all (missing binary, permissions).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("`{command}` exited with status {}: {}", code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()), stderr.trim())]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Invalid or unreadable options.
    #[error("config: {0}")]
    Config(String),

    /// Credentials file missing or malformed.
    #[error("credentials: {0}")]
    Credentials(String),

    /// Local filesystem operation failed.
    #[error("storage: {0}")]
    Storage(String),

    /// Services did not become active in time.
    #[error("timed out after {elapsed:?} waiting for {what}")]
    Timeout { what: String, elapsed: Duration },

    /// Another run holds the host lock.
    #[error(
        "{holder} is already running ({}); wait for it to finish before starting another action",
        path.display()
    )]
    Locked { path: PathBuf, holder: String },

    /// Host is missing something the action needs.
    #[error("unsupported host: {0}")]
    Unsupported(String),

    /// One or more best-effort teardown steps failed.
    #[error("{} step(s) failed:\n  {}", .0.len(), .0.join("\n  "))]
    Teardown(Vec<String>),

    #[error("internal: {0}")]
    Internal(String),
}

pub type StackResult<T> = Result<T, StackError>;
