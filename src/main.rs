//! todo-server: HTTP CRUD service for todo records.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use todo_server::config::Cli;
use todo_server::logging::init_logging;
use todo_server::server::{shutdown_signal, TodoServer};
use todo_server::store;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_filter);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = store::connect(&cli.store_config())
        .await
        .context("failed to open todo store")?;

    let server = TodoServer::new(cli.server_config(), store)
        .bind()
        .await
        .context("failed to start HTTP server")?;

    let outcome = server.serve_until(shutdown_signal()).await;
    tracing::debug!(?outcome, "server stopped");
    Ok(())
}
