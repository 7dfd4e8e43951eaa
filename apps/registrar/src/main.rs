//! Registrar binary entry point.

use clap::Parser;
use registrar::cli::{
    Cli, CliError, Commands, cmd_init, cmd_list, cmd_reindex, cmd_serve, cmd_show, cmd_status,
};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,registrar=debug,tower_http=debug"));

    fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Serve(config) => cmd_serve(config).await,
        Commands::Init { database, force } => cmd_init(&database, force),
        Commands::Status { database, json } => cmd_status(&database, json),
        Commands::List { database, json } => cmd_list(&database, json),
        Commands::Show { id, database } => cmd_show(&database, &id),
        Commands::Reindex { database } => cmd_reindex(&database),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
