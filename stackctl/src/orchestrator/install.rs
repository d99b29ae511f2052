use super::Orchestrator;
use crate::catalog;
use crate::credentials::Credentials;
use crate::errors::StackResult;
use crate::subsystems::identity::{self, SmokeTest};
use crate::subsystems::keystone_wiring;

/// What an operator needs to look at after `install`.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub credentials_path: std::path::PathBuf,
    pub smoke_tests: Vec<SmokeTest>,
}

impl Orchestrator {
    /// Install, configure and start the whole deployment.
    ///
    /// An existing credentials file is reused so a repeated install keeps the
    /// admin token keystone was configured with.
    pub async fn install(&self) -> StackResult<InstallReport> {
        tracing::info!("installing packages");
        self.packages.install(catalog::PACKAGES).await?;

        self.volumes.create_backing_file().await?;

        self.services.start(&catalog::MYSQLD).await?;
        self.services
            .wait_ready(&[catalog::MYSQLD], &self.options.readiness)
            .await?;

        for service in catalog::DATABASE_SERVICES {
            self.database.setup(service).await?;
        }

        let credentials = self.ensure_credentials()?;

        let edits = keystone_wiring(&credentials, &self.options.identity);
        tracing::info!(count = edits.len(), "wiring services to keystone");
        self.config.apply_all(&edits).await?;

        // Pick up the edited configuration.
        self.stop().await?;
        self.start().await?;

        if self.options.seed_identity {
            self.identity
                .seed_sample_data(&credentials, &self.options.identity)
                .await?;
        }

        let smoke_tests = identity::run_smoke_tests(&self.runner, &credentials).await?;

        Ok(InstallReport {
            credentials_path: self.options.credentials_path.clone(),
            smoke_tests,
        })
    }

    fn ensure_credentials(&self) -> StackResult<Credentials> {
        let path = &self.options.credentials_path;
        if path.exists() {
            tracing::info!(path = %path.display(), "reusing existing credentials");
            return Credentials::load(path);
        }

        let credentials = Credentials::generate(&self.options.identity);
        if self.runner.is_dry_run() {
            self.runner
                .note(&format!("write credentials to {}", path.display()));
        } else {
            credentials.write(path)?;
        }
        Ok(credentials)
    }
}
