//! Fixflex CLI - Fixed vs. flexible spending tracker
//!
//! Usage:
//!   fixflex summary statement.csv        Category totals for the last month
//!   fixflex transactions --demo          List sample transactions
//!   fixflex trends statement.csv         Month-over-month changes
//!   fixflex recurring statement.csv      Likely subscriptions and bills
//!   fixflex serve --port 3000            Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = chrono::Local::now().date_naive();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Summary { data, range } => {
            let mut session = commands::load_session(config_path, &data, today)?;
            commands::apply_range(&mut session, &range)?;
            commands::cmd_summary(&session, cli.json)
        }
        Commands::Transactions {
            data,
            range,
            category,
        } => {
            let mut session = commands::load_session(config_path, &data, today)?;
            commands::apply_range(&mut session, &range)?;
            commands::cmd_transactions(&session, category.as_deref(), cli.json)
        }
        Commands::Trends { data, months } => {
            let session = commands::load_session(config_path, &data, today)?;
            commands::cmd_trends(&session, today, months, cli.json)
        }
        Commands::Recurring { data } => {
            let session = commands::load_session(config_path, &data, today)?;
            commands::cmd_recurring(&session, today, cli.json)
        }
        Commands::Categories { data } => {
            let session = commands::load_session(config_path, &data, today)?;
            commands::cmd_categories(&session, cli.json)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
            cors_origins,
            data,
        } => {
            let session = commands::build_session(config_path, &data, today)?;
            commands::cmd_serve(session, &host, port, static_dir.as_deref(), cors_origins).await
        }
        Commands::Config => commands::cmd_config(config_path, cli.json),
    }
}
