mod app;
mod brew;
mod cli;
mod config;
mod error;
mod feedback;
mod runtime;
mod settings;
mod store;
mod theme;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FilterArgs};
use config::Config;
use runtime::commands;

/// Full filter directive, e.g. `cask_launcher=trace`
const LOG_ENV: &str = "CASK_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(&cli)?;

    match cli.command.unwrap_or(Commands::Filter(FilterArgs::default())) {
        Commands::Filter(args) => {
            let query = args.query.as_deref().unwrap_or("");
            commands::filter(&config, query, !args.no_refresh).await
        }
        Commands::Refresh { job } => commands::refresh(&config, &job).await,
        Commands::Invalidate => commands::invalidate(&config),
        Commands::Status => commands::status(&config).await,
    }
}

// stdout carries the Alfred JSON, so logs go to stderr (Alfred's debugger)
fn init_logging(verbose: u8) {
    let alfred_debug = std::env::var("alfred_debug").is_ok_and(|value| value == "1");
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| match verbose {
        0 if alfred_debug => EnvFilter::new("cask_launcher=debug"),
        0 => EnvFilter::new("cask_launcher=warn"),
        1 => EnvFilter::new("cask_launcher=info"),
        _ => EnvFilter::new("cask_launcher=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
