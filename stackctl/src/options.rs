//! Configuration for stackctl.

use crate::errors::{StackError, StackResult};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod envs {
    /// Overrides the state directory.
    pub const STACKCTL_HOME: &str = "STACKCTL_HOME";
    /// Options file read by the CLI.
    pub const STACKCTL_CONFIG: &str = "STACKCTL_CONFIG";
}

/// Name of the state directory under the user's home.
pub const STACKCTL_DIR: &str = ".stackctl";

/// Name of the credentials file under the user's home.
pub const CREDENTIALS_FILE: &str = "keystonerc";

// ============================================================================
// Top-level options
// ============================================================================

/// Everything an orchestration run can be tuned with.
///
/// Every field has a default, so an options file only needs the values it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackOptions {
    /// State directory holding the host lock.
    pub home_dir: PathBuf,

    /// File the credential record is written to and sourced from.
    pub credentials_path: PathBuf,

    pub identity: IdentityOptions,

    pub volumes: VolumeOptions,

    pub readiness: ReadinessPolicy,

    pub privilege: Privilege,

    /// Load Keystone sample tenants, users and endpoints during install.
    pub seed_identity: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        let user_home = home_dir().unwrap_or_else(|| PathBuf::from("."));
        let home_dir = std::env::var_os(envs::STACKCTL_HOME)
            .map(PathBuf::from)
            .unwrap_or_else(|| user_home.join(STACKCTL_DIR));
        Self {
            home_dir,
            credentials_path: user_home.join(CREDENTIALS_FILE),
            identity: IdentityOptions::default(),
            volumes: VolumeOptions::default(),
            readiness: ReadinessPolicy::default(),
            privilege: Privilege::default(),
            seed_identity: true,
        }
    }
}

impl StackOptions {
    /// Reject values no step could work with.
    pub fn validate(&self) -> StackResult<()> {
        self.volumes.validate()?;
        self.readiness.validate()?;
        self.identity.validate()?;
        if self.credentials_path.as_os_str().is_empty() {
            return Err(StackError::Config("credentials_path must not be empty".into()));
        }
        Ok(())
    }

    /// Whether privileged commands should be wrapped in `sudo`.
    pub fn use_sudo(&self) -> bool {
        match self.privilege {
            Privilege::Always => true,
            Privilege::Never => false,
            Privilege::Auto => unsafe { libc::geteuid() != 0 },
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Keystone account values written to the credential record and config files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityOptions {
    pub admin_user: String,
    pub admin_password: String,
    pub admin_tenant: String,
    pub auth_url: String,
    /// Tenant the glance and nova service users belong to.
    pub service_tenant: String,
    pub service_password: String,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            admin_user: "admin".into(),
            admin_password: "verybadpass".into(),
            admin_tenant: "admin".into(),
            auth_url: "http://127.0.0.1:5000/v2.0/".into(),
            service_tenant: "service".into(),
            service_password: "servicepass".into(),
        }
    }
}

impl IdentityOptions {
    fn validate(&self) -> StackResult<()> {
        for (name, value) in [
            ("admin_user", &self.admin_user),
            ("admin_password", &self.admin_password),
            ("admin_tenant", &self.admin_tenant),
            ("service_tenant", &self.service_tenant),
            ("service_password", &self.service_password),
        ] {
            if value.is_empty() {
                return Err(StackError::Config(format!("identity.{name} must not be empty")));
            }
        }
        if !(self.auth_url.starts_with("http://") || self.auth_url.starts_with("https://")) {
            return Err(StackError::Config(format!(
                "identity.auth_url must be an http(s) URL, got '{}'",
                self.auth_url
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Volumes
// ============================================================================

/// Loopback-backed LVM volume group used by nova-volume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeOptions {
    pub group: String,
    pub backing_file: PathBuf,
    pub size_gb: u64,
}

impl Default for VolumeOptions {
    fn default() -> Self {
        Self {
            group: "nova-volumes".into(),
            backing_file: PathBuf::from("/var/lib/nova/nova-volumes.img"),
            size_gb: 20,
        }
    }
}

impl VolumeOptions {
    fn validate(&self) -> StackResult<()> {
        if self.group.is_empty() || self.group.contains('/') {
            return Err(StackError::Config(format!(
                "volumes.group '{}' is not a valid volume group name",
                self.group
            )));
        }
        if !self.backing_file.is_absolute() {
            return Err(StackError::Config(format!(
                "volumes.backing_file must be absolute, got {}",
                self.backing_file.display()
            )));
        }
        if self.size_gb == 0 {
            return Err(StackError::Config("volumes.size_gb must be positive".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Readiness
// ============================================================================

/// How to wait for a tier of services before starting the next one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReadinessPolicy {
    /// Poll `systemctl is-active` until every unit reports active.
    Poll { interval_ms: u64, timeout_secs: u64 },
    /// Sleep a fixed time and assume the services are up.
    FixedDelay { secs: u64 },
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        ReadinessPolicy::Poll {
            interval_ms: 1000,
            timeout_secs: 60,
        }
    }
}

impl ReadinessPolicy {
    fn validate(&self) -> StackResult<()> {
        match *self {
            ReadinessPolicy::Poll {
                interval_ms,
                timeout_secs,
            } => {
                if interval_ms == 0 {
                    return Err(StackError::Config(
                        "readiness.interval_ms must be positive".into(),
                    ));
                }
                if Duration::from_millis(interval_ms) > Duration::from_secs(timeout_secs) {
                    return Err(StackError::Config(
                        "readiness.timeout_secs must be at least one interval".into(),
                    ));
                }
                Ok(())
            }
            ReadinessPolicy::FixedDelay { .. } => Ok(()),
        }
    }
}

/// When to prefix privileged commands with `sudo`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    /// Only when not running as root.
    #[default]
    Auto,
    Always,
    Never,
}
