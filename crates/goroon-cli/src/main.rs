//! goroon CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use goroon_cli::cli::{Cli, Command, ConfigAction};
use goroon_cli::commands;
use goroon_cli::config::ClientConfig;
use goroon_cli::error::ClientResult;
use goroon_cli::options::{BulletinOptions, LoginOptions, ScheduleOptions};
use goroon_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    match cli.command {
        Command::Login => commands::login::run(&LoginOptions::new(&cli.connection, &config)).await,
        Command::Schedule(ref args) => {
            commands::schedule::run(&ScheduleOptions::new(&cli.connection, args, &config)).await
        }
        Command::Bulletin(ref args) => {
            commands::bulletin::run(&BulletinOptions::new(&cli.connection, args, &config)).await
        }
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        },
    }
}
