//! Host lock keeping two orchestration runs from interleaving.
//!
//! The lock is an `flock` on `<home>/.lock`, so it goes away with the process
//! that holds it. While held, the file records the holder's pid and action so
//! a second run can say who it is waiting on.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::errors::{StackError, StackResult};

pub const LOCK_FILE: &str = ".lock";

/// The run recorded in a held lock file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHolder {
    pub pid: u32,
    pub action: String,
}

impl LockHolder {
    fn current(action: Action) -> Self {
        Self {
            pid: std::process::id(),
            action: action.to_string(),
        }
    }

    /// Parse the `pid=<n> action=<name>` record; anything else yields `None`.
    pub fn parse(record: &str) -> Option<Self> {
        let mut pid = None;
        let mut action = None;
        for field in record.split_whitespace() {
            match field.split_once('=') {
                Some(("pid", value)) => pid = value.parse().ok(),
                Some(("action", value)) if !value.is_empty() => action = Some(value.to_string()),
                _ => {}
            }
        }
        Some(Self {
            pid: pid?,
            action: action?,
        })
    }
}

impl fmt::Display for LockHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`stackctl {}` (pid {})", self.action, self.pid)
    }
}

/// Exclusive lock on the stackctl state directory, released on drop.
#[derive(Debug)]
pub struct HostLock {
    file: File,
    path: PathBuf,
}

impl HostLock {
    /// Take the lock for `action` without blocking.
    pub fn acquire(home_dir: &Path, action: Action) -> StackResult<Self> {
        std::fs::create_dir_all(home_dir).map_err(|e| {
            StackError::Storage(format!(
                "failed to create state dir {}: {e}",
                home_dir.display()
            ))
        })?;

        let path = home_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                StackError::Storage(format!("failed to open {}: {e}", path.display()))
            })?;

        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } != 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == ErrorKind::WouldBlock {
                return Err(StackError::Locked {
                    holder: read_holder(&path),
                    path,
                });
            }
            return Err(StackError::Storage(format!(
                "failed to lock {}: {err}",
                path.display()
            )));
        }

        let holder = LockHolder::current(action);
        let mut lock = HostLock { file, path };
        lock.record(&holder)?;
        tracing::debug!(lock_path = %lock.path.display(), %holder, "acquired host lock");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&mut self, holder: &LockHolder) -> StackResult<()> {
        let write = |file: &mut File| -> std::io::Result<()> {
            file.set_len(0)?;
            writeln!(file, "pid={} action={}", holder.pid, holder.action)?;
            file.flush()
        };
        write(&mut self.file).map_err(|e| {
            StackError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

/// Who holds the lock at `path`, as far as its record says.
fn read_holder(path: &Path) -> String {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|record| LockHolder::parse(&record))
        .map_or_else(|| "an unidentified run".to_string(), |h| h.to_string())
}

impl Drop for HostLock {
    fn drop(&mut self) {
        // A released lock names no holder.
        if let Err(e) = self.file.set_len(0) {
            tracing::warn!(lock_path = %self.path.display(), error = %e, "failed to clear lock record");
        }
        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
        tracing::debug!(lock_path = %self.path.display(), "released host lock");
    }
}
