//! Fixed catalog of what an all-in-one Fedora OpenStack host runs.
//!
//! Units, packages and paths are constants; orchestration order lives in
//! [`START_ORDER`] and [`STOP_ORDER`].

use std::fmt;

/// Startup dependency tier. Tiers start in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Database and message broker.
    Infrastructure,
    /// Keystone.
    Identity,
    /// Glance.
    Image,
    /// Nova.
    Compute,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Infrastructure => "infrastructure",
            Tier::Identity => "identity",
            Tier::Image => "image",
            Tier::Compute => "compute",
        })
    }
}

/// A systemd unit managed by stackctl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Service {
    pub unit: &'static str,
    pub tier: Tier,
}

impl Service {
    const fn new(unit: &'static str, tier: Tier) -> Self {
        Self { unit, tier }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.unit)
    }
}

pub const MYSQLD: Service = Service::new("mysqld", Tier::Infrastructure);
pub const QPIDD: Service = Service::new("qpidd", Tier::Infrastructure);
pub const KEYSTONE: Service = Service::new("openstack-keystone", Tier::Identity);
pub const GLANCE_API: Service = Service::new("openstack-glance-api", Tier::Image);
pub const GLANCE_REGISTRY: Service = Service::new("openstack-glance-registry", Tier::Image);
pub const NOVA_API: Service = Service::new("openstack-nova-api", Tier::Compute);
pub const NOVA_OBJECTSTORE: Service = Service::new("openstack-nova-objectstore", Tier::Compute);
pub const NOVA_COMPUTE: Service = Service::new("openstack-nova-compute", Tier::Compute);
pub const NOVA_NETWORK: Service = Service::new("openstack-nova-network", Tier::Compute);
pub const NOVA_VOLUME: Service = Service::new("openstack-nova-volume", Tier::Compute);
pub const NOVA_SCHEDULER: Service = Service::new("openstack-nova-scheduler", Tier::Compute);
pub const NOVA_CERT: Service = Service::new("openstack-nova-cert", Tier::Compute);

pub const INFRASTRUCTURE: &[Service] = &[MYSQLD, QPIDD];
pub const IMAGE: &[Service] = &[GLANCE_API, GLANCE_REGISTRY];
pub const COMPUTE: &[Service] = &[
    NOVA_API,
    NOVA_OBJECTSTORE,
    NOVA_COMPUTE,
    NOVA_NETWORK,
    NOVA_VOLUME,
    NOVA_SCHEDULER,
    NOVA_CERT,
];

/// Every unit `start` brings up, in order.
pub const START_ORDER: &[Service] = &[
    MYSQLD,
    QPIDD,
    KEYSTONE,
    GLANCE_API,
    GLANCE_REGISTRY,
    NOVA_API,
    NOVA_OBJECTSTORE,
    NOVA_COMPUTE,
    NOVA_NETWORK,
    NOVA_VOLUME,
    NOVA_SCHEDULER,
    NOVA_CERT,
];

/// Units `stop` takes down, in order. Database and broker keep running.
pub const STOP_ORDER: &[Service] = &[
    KEYSTONE,
    NOVA_API,
    NOVA_OBJECTSTORE,
    NOVA_COMPUTE,
    NOVA_NETWORK,
    NOVA_VOLUME,
    NOVA_SCHEDULER,
    NOVA_CERT,
    GLANCE_API,
    GLANCE_REGISTRY,
];

/// systemd glob matching every OpenStack unit, used by `erase`.
pub const OPENSTACK_UNIT_GLOB: &str = "openstack-*";

/// Packages installed by `install`.
pub const PACKAGES: &[&str] = &[
    "openstack-nova",
    "openstack-glance",
    "openstack-keystone",
    "openstack-utils",
    "python-novaclient",
    "python-glanceclient",
    "python-keystoneclient",
    "mysql-server",
    "qpid-cpp-server-daemon",
];

/// Package globs removed by `erase`.
pub const ERASE_PACKAGES: &[&str] = &[
    "openstack-*",
    "python-nova*",
    "python-glance*",
    "python-keystone*",
];

/// Services with a database schema, in setup order.
pub const DATABASE_SERVICES: &[&str] = &["nova", "glance", "keystone"];

/// Services whose directories `erase` removes.
pub const ERASED_SERVICES: &[&str] = &["nova", "glance", "keystone", "swift"];

/// Per-service directory roots: config, data, log and runtime state.
pub const SERVICE_DIR_ROOTS: &[&str] = &["/etc", "/var/lib", "/var/log", "/var/run"];

/// libvirt domain state and managed-save images of nova instances.
pub const LIBVIRT_INSTANCE_DIRS: &[&str] =
    &["/var/lib/libvirt/qemu", "/var/lib/libvirt/qemu/save"];

/// Name pattern libvirt gives the state files of nova-created domains.
pub const INSTANCE_STATE_GLOB: &str = "instance-*";

/// All directories `erase` deletes.
pub fn service_directories() -> Vec<String> {
    SERVICE_DIR_ROOTS
        .iter()
        .flat_map(|root| {
            ERASED_SERVICES
                .iter()
                .map(move |service| format!("{root}/{service}"))
        })
        .collect()
}

/// Units of one tier in `START_ORDER` order.
pub fn tier(tier: Tier) -> Vec<Service> {
    START_ORDER
        .iter()
        .copied()
        .filter(|s| s.tier == tier)
        .collect()
}
