//! The admin credential record and its `keystonerc` file.
//!
//! The file is a list of `export KEY=VALUE` lines so an operator can
//! `source` it before using the OpenStack clients by hand.

use crate::errors::{StackError, StackResult};
use crate::exec::shell_quote;
use crate::options::IdentityOptions;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

pub mod keys {
    pub const ADMIN_TOKEN: &str = "ADMIN_TOKEN";
    pub const OS_USERNAME: &str = "OS_USERNAME";
    pub const OS_PASSWORD: &str = "OS_PASSWORD";
    pub const OS_TENANT_NAME: &str = "OS_TENANT_NAME";
    pub const OS_AUTH_URL: &str = "OS_AUTH_URL";
}

/// Random bytes in a generated admin token (hex-encoded to twice as many chars).
const ADMIN_TOKEN_BYTES: usize = 10;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub admin_token: String,
    pub username: String,
    pub password: String,
    pub tenant: String,
    pub auth_url: String,
}

// Keep secrets out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("tenant", &self.tenant)
            .field("auth_url", &self.auth_url)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// New record with a freshly generated admin token.
    pub fn generate(identity: &IdentityOptions) -> Self {
        let token: [u8; ADMIN_TOKEN_BYTES] = rand::random();
        Self {
            admin_token: hex::encode(token),
            username: identity.admin_user.clone(),
            password: identity.admin_password.clone(),
            tenant: identity.admin_tenant.clone(),
            auth_url: identity.auth_url.clone(),
        }
    }

    pub fn render(&self) -> String {
        self.pairs()
            .iter()
            .map(|(key, value)| format!("export {key}={}\n", shell_quote(value)))
            .collect()
    }

    /// Read a record back from `export KEY=VALUE` shell syntax.
    ///
    /// Quoting follows the shell, so values may span lines. Unknown keys are
    /// ignored.
    pub fn parse(content: &str) -> StackResult<Self> {
        let mut admin_token = None;
        let mut username = None;
        let mut password = None;
        let mut tenant = None;
        let mut auth_url = None;

        let words = shlex::split(content)
            .ok_or_else(|| StackError::Credentials("unbalanced quotes".into()))?;

        for word in words.into_iter().filter(|w| w != "export") {
            let (key, value) = word.split_once('=').ok_or_else(|| {
                StackError::Credentials(format!("expected KEY=VALUE, found `{word}`"))
            })?;
            let value = value.to_string();
            match key {
                keys::ADMIN_TOKEN => admin_token = Some(value),
                keys::OS_USERNAME => username = Some(value),
                keys::OS_PASSWORD => password = Some(value),
                keys::OS_TENANT_NAME => tenant = Some(value),
                keys::OS_AUTH_URL => auth_url = Some(value),
                other => tracing::debug!(key = other, "ignoring unknown credentials entry"),
            }
        }

        let require = |value: Option<String>, key: &str| {
            value.ok_or_else(|| StackError::Credentials(format!("missing {key}")))
        };
        Ok(Self {
            admin_token: require(admin_token, keys::ADMIN_TOKEN)?,
            username: require(username, keys::OS_USERNAME)?,
            password: require(password, keys::OS_PASSWORD)?,
            tenant: require(tenant, keys::OS_TENANT_NAME)?,
            auth_url: require(auth_url, keys::OS_AUTH_URL)?,
        })
    }

    /// Source a credentials file written by [`Credentials::write`].
    pub fn load(path: &Path) -> StackResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StackError::Credentials(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content).map_err(|e| match e {
            StackError::Credentials(msg) => {
                StackError::Credentials(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Write the record readable only by its owner.
    pub fn write(&self, path: &Path) -> StackResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StackError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| StackError::Storage(format!("failed to open {}: {}", path.display(), e)))?;
        file.write_all(self.render().as_bytes())
            .map_err(|e| StackError::Storage(format!("failed to write {}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "wrote credentials file");
        Ok(())
    }

    /// Environment the OpenStack command-line clients read.
    pub fn client_env(&self) -> Vec<(String, String)> {
        self.pairs()
            .into_iter()
            .filter(|(key, _)| *key != keys::ADMIN_TOKEN)
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            (keys::ADMIN_TOKEN, &self.admin_token),
            (keys::OS_USERNAME, &self.username),
            (keys::OS_PASSWORD, &self.password),
            (keys::OS_TENANT_NAME, &self.tenant),
            (keys::OS_AUTH_URL, &self.auth_url),
        ]
    }
}
