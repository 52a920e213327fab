//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `parse_date_arg` / `parse_range_args` - Date flag parsing
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use finsight_core::db::Database;
use finsight_core::models::DateRange;
use tracing::debug;

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    debug!(path = path_str, "Opening database");
    Database::new(path_str).context("Failed to open database")
}

/// Parse a `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS` flag.
///
/// Date-only values land on the first second of the day, or the last one
/// when `end_of_day` is set.
pub fn parse_date_arg(value: &str, flag: &str, end_of_day: bool) -> Result<NaiveDateTime> {
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(ts);
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))?;
    let ts = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    ts.with_context(|| format!("Invalid {} date", flag))
}

/// Parse `--from`/`--to` into an inclusive range
pub fn parse_range_args(from: Option<&str>, to: Option<&str>) -> Result<DateRange> {
    let start = from
        .map(|s| parse_date_arg(s, "--from", false))
        .transpose()?;
    let end = to.map(|s| parse_date_arg(s, "--to", true)).transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            bail!("--from must not be after --to");
        }
    }
    Ok(DateRange::new(start, end))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record income:  finsight income add --source Acme --amount 2500 --category Salary");
    println!("  2. Record expense: finsight expense add --amount 42.50 --category Food --payment-method card");
    println!("  3. See reports:    finsight report analytics");

    Ok(())
}
