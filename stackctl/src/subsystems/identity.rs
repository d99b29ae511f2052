//! Keystone sample data and client smoke tests.

use crate::credentials::{Credentials, keys};
use crate::errors::StackResult;
use crate::exec::{BoxedRunner, CommandOutput, Invocation};
use crate::options::IdentityOptions;

/// Client calls whose output tells an operator the deployment answers.
pub const SMOKE_TESTS: &[(&str, &str)] = &[("nova", "flavor-list"), ("glance", "index")];

pub struct IdentitySeeder {
    runner: BoxedRunner,
}

impl IdentitySeeder {
    pub fn new(runner: BoxedRunner) -> Self {
        Self { runner }
    }

    /// Load the admin and service tenants, users, roles and endpoints.
    pub async fn seed_sample_data(
        &self,
        credentials: &Credentials,
        identity: &IdentityOptions,
    ) -> StackResult<()> {
        tracing::info!("loading keystone sample data");
        self.runner
            .check(
                &Invocation::privileged("openstack-keystone-sample-data")
                    .env("ADMIN_PASSWORD", &credentials.password)
                    .env("SERVICE_PASSWORD", &identity.service_password)
                    .env(keys::ADMIN_TOKEN, &credentials.admin_token),
            )
            .await?;
        Ok(())
    }
}

/// Output of one smoke-test client call.
#[derive(Debug, Clone)]
pub struct SmokeTest {
    pub command: String,
    pub output: CommandOutput,
}

/// Run the smoke-test clients as the admin user.
pub async fn run_smoke_tests(
    runner: &BoxedRunner,
    credentials: &Credentials,
) -> StackResult<Vec<SmokeTest>> {
    let mut results = Vec::with_capacity(SMOKE_TESTS.len());
    for (client, subcommand) in SMOKE_TESTS {
        let invocation = Invocation::new(*client)
            .arg(*subcommand)
            .envs(credentials.client_env());
        let output = runner.check(&invocation).await?;
        results.push(SmokeTest {
            command: invocation.to_string(),
            output,
        });
    }
    Ok(results)
}
