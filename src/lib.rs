//! DineDesk - restaurant back-office console
//!
//! Dashboard figures, menu maintenance, order tracking and table QR codes on
//! top of the back-office REST API. The binary is a thin shell around
//! [`run`]; everything else lives in the modules below.

use clap::Parser;
use std::process::ExitCode;
use tracing::info;

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod format;
pub mod logging;
pub mod models;
pub mod session;
pub mod storage;
pub mod stores;
pub mod views;

#[cfg(test)]
mod testing;

use cli::{Cli, Commands};
use commands::Context;
use config::Config;

/// Parse the command line, run one command, persist the session.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        commands::auth::version();
        return ExitCode::SUCCESS;
    }

    let config = Config::resolve(cli.api_url.clone(), cli.data_dir.clone());
    // Keep the guard alive until exit so buffered log lines are flushed.
    let _log_guard = logging::init(&config.log_dir());
    info!(
        "Starting DineDesk v{} against {}",
        env!("CARGO_PKG_VERSION"),
        config.api_url
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(execute(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            info!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli, config: Config) -> anyhow::Result<()> {
    let mut ctx = Context::open(config, cli.yes)?;

    let outcome = match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&mut ctx, &name, &email, password).await,
        Commands::Login { email, password } => {
            commands::auth::login(&mut ctx, &email, password).await
        }
        Commands::Logout => commands::auth::logout(&mut ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Version => {
            commands::auth::version();
            Ok(())
        }
        Commands::Dashboard => commands::dashboard::show(&mut ctx).await,
        Commands::Menu { action } => commands::menu::run(&mut ctx, action).await,
        Commands::Orders { action } => commands::orders::run(&mut ctx, action).await,
        Commands::Tables { action } => commands::tables::run(&mut ctx, action).await,
    };

    // The session is written back even when the command failed.
    let closed = ctx.close();
    outcome.and(closed)
}
