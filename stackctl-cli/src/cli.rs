use anyhow::Context;
use clap::{Args, CommandFactory, Parser};
use stackctl::options::envs;
use stackctl::{Action, DryRunRunner, HostRunner, Orchestrator, StackOptions, host_check};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "stackctl",
    version,
    about = "Install, start, stop or erase an all-in-one OpenStack host",
    after_help = "Actions:\n  \
                  install  Install packages, create databases and wire services to keystone\n  \
                  start    Start every service in dependency order\n  \
                  stop     Stop keystone, nova and glance\n  \
                  erase    Stop everything and remove packages, data and credentials"
)]
pub struct Cli {
    /// One of: start, stop, install, erase
    #[arg(value_name = "ACTION")]
    pub action: Option<String>,

    #[command(flatten)]
    pub global: GlobalFlags,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// JSON or YAML options file
    #[arg(long, env = envs::STACKCTL_CONFIG, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// State directory holding the host lock (default: ~/.stackctl)
    #[arg(long, env = envs::STACKCTL_HOME, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Print every command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(long)]
    pub debug: bool,
}

impl GlobalFlags {
    pub fn load_options(&self) -> anyhow::Result<StackOptions> {
        let mut options = match &self.config {
            Some(path) => read_options(path)?,
            None => StackOptions::default(),
        };
        if let Some(home) = &self.home {
            options.home_dir = home.clone();
        }
        Ok(options)
    }

    /// Build an orchestrator for `action`.
    ///
    /// Real runs check the host for the programs the action needs first.
    pub fn create_orchestrator(&self, action: Action) -> anyhow::Result<Orchestrator> {
        let options = self.load_options()?;
        let use_sudo = options.use_sudo();

        let orchestrator = if self.dry_run {
            Orchestrator::new(options, Arc::new(DryRunRunner::stdout(use_sudo)))?
        } else {
            host_check::check_action(action, use_sudo)?;
            Orchestrator::new(options, Arc::new(HostRunner::new(use_sudo)))?
        };
        Ok(orchestrator)
    }
}

fn read_options(path: &Path) -> anyhow::Result<StackOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let options = if is_json {
        serde_json::from_str(&content).map_err(anyhow::Error::from)
    } else {
        serde_yaml::from_str(&content).map_err(anyhow::Error::from)
    }
    .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded options");
    Ok(options)
}

pub fn print_usage() {
    println!("{}", Cli::command().render_usage());
    println!();
    println!("Actions: start | stop | install | erase");
    println!("Run `stackctl --help` for options.");
}
