//! yum wrapper.

use crate::errors::StackResult;
use crate::exec::{BoxedRunner, Invocation};

pub struct PackageManager {
    runner: BoxedRunner,
}

impl PackageManager {
    pub fn new(runner: BoxedRunner) -> Self {
        Self { runner }
    }

    pub async fn install(&self, packages: &[&str]) -> StackResult<()> {
        self.yum("install", packages).await
    }

    /// Remove packages; globs such as `openstack-*` are expanded by yum.
    pub async fn remove(&self, patterns: &[&str]) -> StackResult<()> {
        self.yum("erase", patterns).await
    }

    async fn yum(&self, verb: &str, packages: &[&str]) -> StackResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        tracing::info!(verb, count = packages.len(), "yum");
        self.runner
            .check(
                &Invocation::privileged("yum")
                    .args([verb, "-y"])
                    .args(packages.iter().copied()),
            )
            .await?;
        Ok(())
    }
}
