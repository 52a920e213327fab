//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Finsight - Track incomes and expenses, see where the money goes
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Self-hosted personal finance analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "finsight.db", global = true)]
    pub db: PathBuf,

    /// Ledger owner to act as
    #[arg(short, long, default_value = "local-dev", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage incomes
    Income {
        #[command(subcommand)]
        action: IncomeAction,
    },

    /// Manage expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
pub enum IncomeAction {
    /// Record an income
    Add {
        /// Where the money came from
        #[arg(long)]
        source: String,

        /// Amount (non-negative, at most 2 decimal places)
        #[arg(long)]
        amount: Decimal,

        #[arg(long)]
        category: String,

        /// Date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, defaults to now)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        observations: Option<String>,
    },

    /// List recent incomes
    List(ListArgs),

    /// Hide an income from reports
    Archive { id: i64 },

    /// Delete an income
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// Record an expense
    Add {
        /// Amount (non-negative, at most 2 decimal places)
        #[arg(long)]
        amount: Decimal,

        #[arg(long)]
        category: String,

        /// How it was paid (card, cash, transfer, ...)
        #[arg(long)]
        payment_method: String,

        /// Date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, defaults to now)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// List recent expenses
    List(ListArgs),

    /// Hide an expense from reports
    Archive { id: i64 },

    /// Delete an expense
    Delete { id: i64 },
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Number of records to show
    #[arg(long, default_value = "20")]
    pub limit: i64,
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Full analytics dashboard
    Analytics {
        /// Calendar year (defaults to the current year for monthly series)
        #[arg(long)]
        year: Option<i32>,

        /// Start date (YYYY-MM-DD) - overrides year for totals
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// KPIs for one month
    Monthly {
        #[arg(long)]
        year: Option<i32>,

        /// Month number (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Income, expense and balance for a period
    Balance {
        /// Day of month (1-31)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: Option<u32>,

        /// Month number (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        #[arg(long)]
        year: Option<i32>,

        /// Start date (YYYY-MM-DD) - overrides day/month/year
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}
