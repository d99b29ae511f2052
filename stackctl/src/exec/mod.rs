//! External command execution.
//!
//! Everything stackctl does to the host goes through a [`CommandRunner`]:
//!
//! - [`HostRunner`] spawns the program (under `sudo` when asked to).
//! - [`DryRunRunner`] prints what would run and reports success.
//! - Tests use the recording runner from `stackctl-test-utils`.

mod dry_run;
mod host;
mod invocation;

pub use dry_run::DryRunRunner;
pub use host::HostRunner;
pub use invocation::{CommandOutput, Invocation, shell_quote};
pub(crate) use invocation::preserve_env_flag;

use crate::errors::StackResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs [`Invocation`]s and returns their output.
///
/// `run` only fails when the program could not be executed. A non-zero exit
/// is reported through [`CommandOutput::code`]; use [`CommandRunner::check`]
/// when that should be an error.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> StackResult<CommandOutput>;

    /// Run and fail on non-zero exit.
    async fn check(&self, invocation: &Invocation) -> StackResult<CommandOutput> {
        self.run(invocation).await?.check(invocation)
    }

    /// Whether commands are only being reported, not executed.
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Report a step that does not go through an external program.
    fn note(&self, message: &str) {
        tracing::info!("{message}");
    }
}

pub type BoxedRunner = Arc<dyn CommandRunner>;
