//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_session` / `build_session` - Build a session from CSV files or demo data
//! - `apply_range` - Apply --from/--to/--all to a session
//! - `cmd_config` - Show the effective configuration

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use fixflex_core::{DateRange, Session, TrackerConfig};
use tracing::{info, warn};

use super::print_json;
use crate::cli::{DataArgs, RangeArgs};

/// Build a session for a report; at least one CSV file or --demo is required
pub fn load_session(
    config_path: Option<&Path>,
    data: &DataArgs,
    today: NaiveDate,
) -> Result<Session> {
    if data.files.is_empty() && !data.demo {
        bail!("No transactions: pass one or more CSV files or --demo");
    }
    build_session(config_path, data, today)
}

/// Load config and build a session from the given statements (possibly none)
pub fn build_session(
    config_path: Option<&Path>,
    data: &DataArgs,
    today: NaiveDate,
) -> Result<Session> {
    let (config, source) =
        TrackerConfig::load(config_path).context("Failed to load configuration")?;
    info!("Using config: {}", source);

    let mut session = Session::new(config);

    if data.demo {
        if !data.files.is_empty() {
            warn!("--demo given; ignoring {} CSV file(s)", data.files.len());
        }
        session.load_demo(today);
        return Ok(session);
    }

    for path in &data.files {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let summary = session
            .import_csv(&name, file, today)
            .with_context(|| format!("Failed to import {}", path.display()))?;

        for row in &summary.skipped {
            warn!("{}: skipped line {} ({})", name, row.line, row.reason);
        }
    }

    Ok(session)
}

/// Parse a YYYY-MM-DD command-line date
pub fn parse_date_arg(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// Override the session's default range with --from/--to, or drop it with --all
pub fn apply_range(session: &mut Session, args: &RangeArgs) -> Result<()> {
    if args.all {
        session.set_date_range(DateRange::default());
        return Ok(());
    }
    if args.from.is_none() && args.to.is_none() {
        return Ok(());
    }

    let current = session.range();
    let start = match &args.from {
        Some(from) => Some(parse_date_arg(from, "--from")?),
        None => current.start,
    };
    let end = match &args.to {
        Some(to) => Some(parse_date_arg(to, "--to")?),
        None => current.end,
    };

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("--from {} is after --to {}", start, end);
        }
    }

    session.set_date_range(DateRange { start, end });
    Ok(())
}

pub fn cmd_config(config_path: Option<&Path>, json: bool) -> Result<()> {
    let (config, source) =
        TrackerConfig::load(config_path).context("Failed to load configuration")?;

    if json {
        return print_json(&serde_json::json!({
            "source": source,
            "config": config,
        }));
    }

    println!();
    println!("⚙️  Configuration");
    println!("   Source: {}", source);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Fixed categories:     {}", config.fixed_categories.join(", "));
    println!("   Trend months:         {}", config.trend_months);
    println!("   Default range months: {}", config.default_range_months);
    println!();
    println!("   Recurring detection");
    println!(
        "     Amount tolerance:   {:.0}%",
        config.recurring.amount_tolerance * 100.0
    );
    println!("     Lookback months:    {}", config.recurring.lookback_months);
    println!(
        "     Min description:    {} chars",
        config.recurring.min_description_len
    );
    println!("     Min occurrences:    {}", config.recurring.min_occurrences);

    Ok(())
}
