//! systemd unit control and readiness waiting.

use crate::catalog::Service;
use crate::errors::{StackError, StackResult};
use crate::exec::{BoxedRunner, Invocation};
use crate::options::ReadinessPolicy;
use std::time::Duration;
use tokio::time::Instant;

pub struct ServiceManager {
    runner: BoxedRunner,
}

impl ServiceManager {
    pub fn new(runner: BoxedRunner) -> Self {
        Self { runner }
    }

    pub async fn start(&self, service: &Service) -> StackResult<()> {
        self.systemctl("start", service.unit).await
    }

    pub async fn stop(&self, service: &Service) -> StackResult<()> {
        self.systemctl("stop", service.unit).await
    }

    pub async fn restart(&self, service: &Service) -> StackResult<()> {
        self.systemctl("restart", service.unit).await
    }

    /// Stop every loaded unit matching a systemd glob such as `openstack-*`.
    pub async fn stop_matching(&self, pattern: &str) -> StackResult<()> {
        self.systemctl("stop", pattern).await
    }

    pub async fn is_active(&self, service: &Service) -> StackResult<bool> {
        let output = self
            .runner
            .run(&Invocation::new("systemctl").args(["is-active", "--quiet", service.unit]))
            .await?;
        Ok(output.is_success())
    }

    /// Block until `services` are up according to `policy`.
    pub async fn wait_ready(
        &self,
        services: &[Service],
        policy: &ReadinessPolicy,
    ) -> StackResult<()> {
        match *policy {
            ReadinessPolicy::FixedDelay { secs } => {
                if self.runner.is_dry_run() {
                    return Ok(());
                }
                tracing::debug!(secs, "waiting a fixed delay for services to settle");
                tokio::time::sleep(Duration::from_secs(secs)).await;
                Ok(())
            }
            ReadinessPolicy::Poll {
                interval_ms,
                timeout_secs,
            } => {
                self.poll_active(
                    services,
                    Duration::from_millis(interval_ms),
                    Duration::from_secs(timeout_secs),
                )
                .await
            }
        }
    }

    async fn poll_active(
        &self,
        services: &[Service],
        interval: Duration,
        timeout: Duration,
    ) -> StackResult<()> {
        let started = Instant::now();
        loop {
            let mut pending = Vec::new();
            for service in services {
                if !self.is_active(service).await? {
                    pending.push(service.unit);
                }
            }

            if pending.is_empty() {
                tracing::debug!(elapsed = ?started.elapsed(), "services active");
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(StackError::Timeout {
                    what: pending.join(", "),
                    elapsed,
                });
            }
            tracing::debug!(pending = ?pending, "waiting for services");
            tokio::time::sleep(interval).await;
        }
    }

    async fn systemctl(&self, verb: &str, unit: &str) -> StackResult<()> {
        self.runner
            .check(&Invocation::privileged("systemctl").args([verb, unit]))
            .await?;
        Ok(())
    }
}
