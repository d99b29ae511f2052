use super::Orchestrator;
use crate::catalog;
use crate::errors::{StackError, StackResult};
use crate::exec::Invocation;

/// Failures of best-effort steps, reported together at the end.
#[derive(Default)]
struct Failures(Vec<String>);

impl Failures {
    fn record(&mut self, step: &str, result: StackResult<()>) {
        if let Err(e) = result {
            tracing::warn!(step, error = %e, "erase step failed, continuing");
            self.0.push(format!("{step}: {e}"));
        }
    }

    fn into_result(self) -> StackResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(StackError::Teardown(self.0))
        }
    }
}

impl Orchestrator {
    /// Remove everything `install` put on the host.
    ///
    /// Services are stopped before anything is deleted. Later steps still run
    /// when earlier ones fail, so a half-installed host can be cleaned up.
    pub async fn erase(&self) -> StackResult<()> {
        let mut failures = Failures::default();

        failures.record("stop services", self.stop().await);

        failures.record("remove instances", self.remove_instances().await);
        failures.record(
            "stop remaining units",
            self.services
                .stop_matching(catalog::OPENSTACK_UNIT_GLOB)
                .await,
        );
        failures.record(
            "remove packages",
            self.packages.remove(catalog::ERASE_PACKAGES).await,
        );

        failures.record("drop databases", self.drop_databases().await);

        failures.record("deactivate volume group", self.volumes.deactivate().await);
        failures.record("remove volume group", self.volumes.remove_group().await);
        failures.record("detach loop device", self.volumes.detach().await);
        failures.record(
            "remove backing file",
            self.volumes.remove_backing_file().await,
        );

        failures.record("remove service directories", self.remove_directories().await);
        failures.record("remove credentials", self.remove_credentials());

        failures.into_result()
    }

    /// Force-remove libvirt state of the domains nova-compute created.
    ///
    /// Only files are removed; a directory named `instance-*` is left alone.
    async fn remove_instances(&self) -> StackResult<()> {
        for dir in catalog::LIBVIRT_INSTANCE_DIRS {
            let present = self
                .runner
                .run(&Invocation::privileged("test").args(["-d", dir]))
                .await?
                .is_success();
            if !present {
                tracing::debug!(dir, "no libvirt state directory");
                continue;
            }

            self.runner
                .check(&Invocation::privileged("find").args([
                    dir,
                    "-maxdepth",
                    "1",
                    "-name",
                    catalog::INSTANCE_STATE_GLOB,
                    "!",
                    "-type",
                    "d",
                    "-exec",
                    "rm",
                    "-f",
                    "{}",
                    "+",
                ]))
                .await?;
        }
        Ok(())
    }

    /// The drop script needs a running server.
    async fn drop_databases(&self) -> StackResult<()> {
        self.services.restart(&catalog::MYSQLD).await?;
        self.services
            .wait_ready(&[catalog::MYSQLD], &self.options.readiness)
            .await?;
        self.database.drop_all(catalog::DATABASE_SERVICES).await
    }

    async fn remove_directories(&self) -> StackResult<()> {
        self.runner
            .check(
                &Invocation::privileged("rm")
                    .arg("-rf")
                    .args(catalog::service_directories()),
            )
            .await?;
        Ok(())
    }

    fn remove_credentials(&self) -> StackResult<()> {
        let path = &self.options.credentials_path;
        if self.runner.is_dry_run() {
            self.runner
                .note(&format!("remove credentials {}", path.display()));
            return Ok(());
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed credentials file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StackError::Storage(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
