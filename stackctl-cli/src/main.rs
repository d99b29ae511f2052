mod cli;
mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;
use stackctl::Action;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            // Usage errors exit 0, like an unknown action.
            _ => {
                eprintln!("{e}");
                cli::print_usage();
                return;
            }
        },
    };
    init_logging(cli.global.debug);

    let action = match cli.action.as_deref().map(str::parse::<Action>) {
        None => {
            cli::print_usage();
            return;
        }
        Some(Err(unknown)) => {
            eprintln!("{unknown}");
            cli::print_usage();
            return;
        }
        Some(Ok(action)) => action,
    };

    let result = match action {
        Action::Install => commands::install::execute(&cli.global).await,
        Action::Start => commands::start::execute(&cli.global).await,
        Action::Stop => commands::stop::execute(&cli.global).await,
        Action::Erase => commands::erase::execute(&cli.global).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout carries only results and dry-run plans.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
