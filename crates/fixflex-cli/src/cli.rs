//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fixflex - See where your money goes, fixed vs. flexible
#[derive(Parser)]
#[command(name = "fixflex")]
#[command(about = "Fixed vs. flexible spending tracker for bank statement CSVs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the user override, then the built-in config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the transactions come from
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Statement CSV files (Transaction Date, Description, Amount, ...)
    pub files: Vec<PathBuf>,

    /// Load the built-in sample transactions instead of files
    #[arg(long)]
    pub demo: bool,
}

/// Date range overrides (YYYY-MM-DD)
///
/// Without them the view covers the last month up to today.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start date (inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Ignore the date range and use every transaction
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub all: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Category totals and the fixed/flexible split for the date range
    Summary {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// List the transactions in the date range
    Transactions {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        range: RangeArgs,

        /// Only show one category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Monthly totals and month-over-month category changes
    Trends {
        #[command(flatten)]
        data: DataArgs,

        /// Only show the most recent N months (1-120)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=120))]
        months: Option<u32>,
    },

    /// Charges that look like subscriptions or bills
    Recurring {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Available categories and whether they are fixed or flexible
    Categories {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allow cross-origin requests from this origin (repeatable)
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,

        /// Statements to preload (or --demo)
        #[command(flatten)]
        data: DataArgs,
    },

    /// Show the effective configuration and where it came from
    Config,
}
