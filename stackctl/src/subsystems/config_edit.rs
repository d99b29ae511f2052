//! In-place ini edits through `openstack-config-set`.

use crate::credentials::Credentials;
use crate::errors::StackResult;
use crate::exec::{BoxedRunner, Invocation};
use crate::options::IdentityOptions;

pub mod files {
    pub const KEYSTONE_CONF: &str = "/etc/keystone/keystone.conf";
    pub const GLANCE_API_CONF: &str = "/etc/glance/glance-api.conf";
    pub const GLANCE_REGISTRY_CONF: &str = "/etc/glance/glance-registry.conf";
    pub const GLANCE_API_PASTE: &str = "/etc/glance/glance-api-paste.ini";
    pub const GLANCE_REGISTRY_PASTE: &str = "/etc/glance/glance-registry-paste.ini";
    pub const NOVA_API_PASTE: &str = "/etc/nova/api-paste.ini";
    pub const NOVA_CONF: &str = "/etc/nova/nova.conf";
}

const AUTHTOKEN_SECTION: &str = "filter:authtoken";

/// Keys whose values are never shown in logs, plans or error messages.
const SECRET_KEYS: &[&str] = &["admin_token", "admin_password"];

/// One `file [section] key = value` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEdit {
    pub file: &'static str,
    pub section: &'static str,
    pub key: &'static str,
    pub value: String,
}

impl ConfigEdit {
    pub fn new(
        file: &'static str,
        section: &'static str,
        key: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            file,
            section,
            key,
            value: value.into(),
        }
    }

    pub fn is_secret(&self) -> bool {
        SECRET_KEYS.contains(&self.key)
    }

    fn invocation(&self) -> Invocation {
        let invocation =
            Invocation::privileged("openstack-config-set").args([self.file, self.section, self.key]);
        if self.is_secret() {
            invocation.secret_arg(&self.value)
        } else {
            invocation.arg(&self.value)
        }
    }
}

/// Settings that point keystone at the admin token and put glance and nova
/// behind keystone's auth middleware.
pub fn keystone_wiring(credentials: &Credentials, identity: &IdentityOptions) -> Vec<ConfigEdit> {
    let mut edits = vec![
        ConfigEdit::new(
            files::KEYSTONE_CONF,
            "DEFAULT",
            "admin_token",
            &credentials.admin_token,
        ),
        ConfigEdit::new(files::GLANCE_API_CONF, "paste_deploy", "flavor", "keystone"),
        ConfigEdit::new(files::GLANCE_REGISTRY_CONF, "paste_deploy", "flavor", "keystone"),
    ];

    for (paste, user) in [
        (files::GLANCE_API_PASTE, "glance"),
        (files::GLANCE_REGISTRY_PASTE, "glance"),
        (files::NOVA_API_PASTE, "nova"),
    ] {
        edits.push(ConfigEdit::new(
            paste,
            AUTHTOKEN_SECTION,
            "admin_tenant_name",
            &identity.service_tenant,
        ));
        edits.push(ConfigEdit::new(paste, AUTHTOKEN_SECTION, "admin_user", user));
        edits.push(ConfigEdit::new(
            paste,
            AUTHTOKEN_SECTION,
            "admin_password",
            &identity.service_password,
        ));
    }

    edits.push(ConfigEdit::new(
        files::NOVA_CONF,
        "DEFAULT",
        "auth_strategy",
        "keystone",
    ));
    edits
}

pub struct ConfigEditor {
    runner: BoxedRunner,
}

impl ConfigEditor {
    pub fn new(runner: BoxedRunner) -> Self {
        Self { runner }
    }

    pub async fn apply(&self, edit: &ConfigEdit) -> StackResult<()> {
        tracing::debug!(file = edit.file, section = edit.section, key = edit.key, "config edit");
        self.runner.check(&edit.invocation()).await?;
        Ok(())
    }

    pub async fn apply_all(&self, edits: &[ConfigEdit]) -> StackResult<()> {
        for edit in edits {
            self.apply(edit).await?;
        }
        Ok(())
    }
}
