//! MySQL schema and user management for the OpenStack services.
//!
//! Creation is delegated to the `openstack-<service>-db-setup` helpers that
//! ship with each package. Removal pipes a fixed script into `mysql`.

use crate::errors::StackResult;
use crate::exec::{BoxedRunner, Invocation};

/// Hosts each service user is granted from by the setup helpers.
const USER_HOSTS: &[&str] = &["localhost", "%"];

pub struct DatabaseAdmin {
    runner: BoxedRunner,
}

impl DatabaseAdmin {
    pub fn new(runner: BoxedRunner) -> Self {
        Self { runner }
    }

    /// Create the schema and user of `service` (e.g. `nova`).
    pub async fn setup(&self, service: &str) -> StackResult<()> {
        tracing::info!(service, "creating database");
        self.runner
            .check(&Invocation::privileged(format!("openstack-{service}-db-setup")).arg("--yes"))
            .await?;
        Ok(())
    }

    /// Drop the users and databases of `services`.
    ///
    /// `--force` keeps mysql going past users that were never created.
    pub async fn drop_all(&self, services: &[&str]) -> StackResult<()> {
        self.runner
            .check(
                &Invocation::privileged("mysql")
                    .args(["--force", "-u", "root"])
                    .stdin(drop_script(services)),
            )
            .await?;
        Ok(())
    }
}

pub fn drop_script(services: &[&str]) -> String {
    let mut script = String::new();
    for service in services {
        for host in USER_HOSTS {
            script.push_str(&format!("DROP USER '{service}'@'{host}';\n"));
        }
    }
    for service in services {
        script.push_str(&format!("DROP DATABASE IF EXISTS {service};\n"));
    }
    script.push_str("FLUSH PRIVILEGES;\n");
    script
}
