//! Wrappers around the host tools stackctl drives.
//!
//! Each manager owns a runner handle and turns one concern into typed calls.
//! None of them decide ordering; that is the orchestrator's job.

pub mod config_edit;
pub mod database;
pub mod identity;
pub mod packages;
pub mod services;
pub mod volumes;

pub use config_edit::{ConfigEdit, ConfigEditor, keystone_wiring};
pub use database::DatabaseAdmin;
pub use identity::{IdentitySeeder, SmokeTest};
pub use packages::PackageManager;
pub use services::ServiceManager;
pub use volumes::VolumeGroupManager;
