//! Lifecycle orchestration.
//!
//! ## Ordering
//!
//! ```text
//! start:   mysqld, qpidd ─wait─→ keystone ─wait─→ glance {api, registry}
//!                 ─→ volume group ─→ nova {api, objectstore, compute,
//!                                          network, volume, scheduler, cert}
//!
//! stop:    keystone ─→ nova (same order) ─→ glance {api, registry}
//! ```
//!
//! `install` and `erase` live in their own files and build on these two.
//! `install`/`start` stop at the first failing step; `stop` and `erase`
//! try every step and report failures together.

mod erase;
mod install;

pub use install::InstallReport;

use crate::action::Action;
use crate::catalog::{self, Service, Tier};
use crate::errors::{StackError, StackResult};
use crate::exec::BoxedRunner;
use crate::lock::HostLock;
use crate::options::StackOptions;
use crate::subsystems::{
    ConfigEditor, DatabaseAdmin, IdentitySeeder, PackageManager, ServiceManager,
    VolumeGroupManager,
};

pub struct Orchestrator {
    options: StackOptions,
    runner: BoxedRunner,
    services: ServiceManager,
    packages: PackageManager,
    database: DatabaseAdmin,
    volumes: VolumeGroupManager,
    config: ConfigEditor,
    identity: IdentitySeeder,
}

impl Orchestrator {
    pub fn new(options: StackOptions, runner: BoxedRunner) -> StackResult<Self> {
        options.validate()?;
        Ok(Self {
            services: ServiceManager::new(runner.clone()),
            packages: PackageManager::new(runner.clone()),
            database: DatabaseAdmin::new(runner.clone()),
            volumes: VolumeGroupManager::new(runner.clone(), options.volumes.clone()),
            config: ConfigEditor::new(runner.clone()),
            identity: IdentitySeeder::new(runner.clone()),
            runner,
            options,
        })
    }

    pub fn options(&self) -> &StackOptions {
        &self.options
    }

    /// Take the host lock for `action`, unless nothing is really going to run.
    pub fn lock(&self, action: Action) -> StackResult<Option<HostLock>> {
        if self.runner.is_dry_run() {
            return Ok(None);
        }
        HostLock::acquire(&self.options.home_dir, action).map(Some)
    }

    /// Bring every service up in dependency order.
    pub async fn start(&self) -> StackResult<()> {
        tracing::info!("starting services");

        self.start_tier(Tier::Infrastructure).await?;
        self.wait_tier(Tier::Infrastructure).await?;

        self.start_tier(Tier::Identity).await?;
        self.wait_tier(Tier::Identity).await?;

        self.start_tier(Tier::Image).await?;

        let device = self.volumes.attach().await?;
        tracing::info!(group = %self.options.volumes.group, %device, "volume group ready");

        self.start_tier(Tier::Compute).await?;

        tracing::info!("all services started");
        Ok(())
    }

    /// Take down identity, compute and image services.
    ///
    /// Every unit is attempted; the database and broker keep running.
    pub async fn stop(&self) -> StackResult<()> {
        tracing::info!("stopping services");
        let mut failures = Vec::new();
        for service in catalog::STOP_ORDER {
            if let Err(e) = self.services.stop(service).await {
                tracing::warn!(unit = service.unit, error = %e, "failed to stop service");
                failures.push(format!("{}: {}", service.unit, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StackError::Teardown(failures))
        }
    }

    async fn start_tier(&self, tier: Tier) -> StackResult<()> {
        for service in catalog::tier(tier) {
            tracing::debug!(unit = service.unit, %tier, "starting service");
            self.services.start(&service).await?;
        }
        Ok(())
    }

    async fn wait_tier(&self, tier: Tier) -> StackResult<()> {
        let services: Vec<Service> = catalog::tier(tier);
        self.services
            .wait_ready(&services, &self.options.readiness)
            .await
    }
}
