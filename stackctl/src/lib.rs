//! stackctl - lifecycle orchestration for an all-in-one OpenStack host.
//!
//! Installs, starts, stops and erases Keystone, Glance and Nova together with
//! the MySQL database, the Qpid broker and an LVM volume group, by driving the
//! host's own tools (`systemctl`, `yum`, `mysql`, LVM, `losetup`,
//! `openstack-config-set`) in a fixed order.
//!
//! ```no_run
//! use std::sync::Arc;
//! use stackctl::{Action, HostRunner, Orchestrator, StackOptions};
//!
//! # async fn run() -> stackctl::StackResult<()> {
//! let options = StackOptions::default();
//! let runner = Arc::new(HostRunner::new(options.use_sudo()));
//! let orchestrator = Orchestrator::new(options, runner)?;
//! let _lock = orchestrator.lock(Action::Start)?;
//! orchestrator.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod catalog;
pub mod credentials;
pub mod errors;
pub mod exec;
pub mod host_check;
pub mod lock;
pub mod options;
pub mod orchestrator;
pub mod subsystems;

pub use action::{Action, UnknownAction};
pub use credentials::Credentials;
pub use errors::{StackError, StackResult};
pub use exec::{BoxedRunner, CommandOutput, CommandRunner, DryRunRunner, HostRunner, Invocation};
pub use lock::{HostLock, LockHolder};
pub use options::{ReadinessPolicy, StackOptions};
pub use orchestrator::{InstallReport, Orchestrator};
