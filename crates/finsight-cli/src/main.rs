//! Finsight CLI - Personal finance analytics
//!
//! Usage:
//!   finsight init                         Initialize database
//!   finsight income add --source S ...    Record an income
//!   finsight expense add --amount A ...   Record an expense
//!   finsight report analytics --year Y    Dashboard report
//!   finsight serve --port 3000            Start web server

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

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth).await,
        Commands::Income { action } => {
            let db = commands::open_db(&cli.db)?;
            let user_id = db.ensure_user(&cli.user)?;
            match action {
                IncomeAction::Add {
                    source,
                    amount,
                    category,
                    date,
                    observations,
                } => commands::cmd_income_add(
                    &db,
                    user_id,
                    &source,
                    amount,
                    &category,
                    date.as_deref(),
                    observations.as_deref(),
                )
                .map(|_| ()),
                IncomeAction::List(args) => commands::cmd_income_list(
                    &db,
                    user_id,
                    args.from.as_deref(),
                    args.to.as_deref(),
                    args.limit,
                ),
                IncomeAction::Archive { id } => commands::cmd_income_archive(&db, user_id, id),
                IncomeAction::Delete { id } => commands::cmd_income_delete(&db, user_id, id),
            }
        }
        Commands::Expense { action } => {
            let db = commands::open_db(&cli.db)?;
            let user_id = db.ensure_user(&cli.user)?;
            match action {
                ExpenseAction::Add {
                    amount,
                    category,
                    payment_method,
                    date,
                    description,
                } => commands::cmd_expense_add(
                    &db,
                    user_id,
                    amount,
                    &category,
                    &payment_method,
                    date.as_deref(),
                    description.as_deref(),
                )
                .map(|_| ()),
                ExpenseAction::List(args) => commands::cmd_expense_list(
                    &db,
                    user_id,
                    args.from.as_deref(),
                    args.to.as_deref(),
                    args.limit,
                ),
                ExpenseAction::Archive { id } => commands::cmd_expense_archive(&db, user_id, id),
                ExpenseAction::Delete { id } => commands::cmd_expense_delete(&db, user_id, id),
            }
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db)?;
            let user_id = db.ensure_user(&cli.user)?;
            match report_type {
                ReportType::Analytics {
                    year,
                    from,
                    to,
                    json,
                } => commands::cmd_report_analytics(
                    &db,
                    user_id,
                    year,
                    from.as_deref(),
                    to.as_deref(),
                    json,
                ),
                ReportType::Monthly { year, month, json } => {
                    commands::cmd_report_monthly(&db, user_id, year, month, json)
                }
                ReportType::Balance {
                    day,
                    month,
                    year,
                    from,
                    to,
                    json,
                } => {
                    let filter = commands::balance_filter(
                        day,
                        month,
                        year,
                        from.as_deref(),
                        to.as_deref(),
                    )?;
                    commands::cmd_report_balance(&db, user_id, filter, json)
                }
            }
        }
    }
}
