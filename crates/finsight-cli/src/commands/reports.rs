//! Report command implementations

use anyhow::Result;
use finsight_core::db::Database;
use finsight_core::models::{BalanceFilter, ReportFilter};
use finsight_core::AnalyticsEngine;
use rust_decimal::Decimal;

use super::{parse_range_args, truncate};

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

fn print_kpis(income: Decimal, expense: Decimal, balance: Decimal, savings_percent: Decimal) {
    println!("   Income:   {:>12.2}", income);
    println!("   Expenses: {:>12.2}", expense);
    println!("   Balance:  {:>12.2}", balance);
    println!("   Savings:  {:>11.2}%", savings_percent);
}

pub fn cmd_report_analytics(
    db: &Database,
    user_id: i64,
    year: Option<i32>,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let filter = ReportFilter {
        year,
        range: parse_range_args(from, to)?,
    };
    let report = AnalyticsEngine::new(db).report(user_id, &filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Analytics");
    println!("{}", RULE);
    print_kpis(
        report.kpis.total_income,
        report.kpis.total_expense,
        report.kpis.monthly_balance,
        report.kpis.savings_percent,
    );

    println!();
    println!("   {:12} │ {:>10} │ {:>10} │ {:>10}", "Month", "Income", "Expenses", "Balance");
    println!("   ─────────────┼────────────┼────────────┼────────────");
    for ((income, expense), balance) in report
        .income_by_month
        .iter()
        .zip(&report.expenses_by_month)
        .zip(&report.monthly_balances)
    {
        println!(
            "   {:12} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
            income.month, income.total, expense.total, balance
        );
    }

    if report.expenses_pareto.is_empty() {
        println!();
        println!("   No expenses in this period.");
        return Ok(());
    }

    println!();
    println!("   {:25} │ {:>10} │ {:>7}", "Category", "Amount", "Cum. %");
    println!("   ──────────────────────────┼────────────┼────────");
    for entry in &report.expenses_pareto {
        println!(
            "   {:25} │ {:>10.2} │ {:>6.1}%",
            truncate(&entry.category, 25),
            entry.total,
            entry.cumulative_percent
        );
    }

    println!();
    println!("   Expense sizes:");
    for band in &report.expenses_distribution {
        println!("     {:>10}: {}", band.amount_range, band.count);
    }

    Ok(())
}

pub fn cmd_report_monthly(
    db: &Database,
    user_id: i64,
    year: Option<i32>,
    month: Option<u32>,
    json: bool,
) -> Result<()> {
    let report = AnalyticsEngine::new(db).monthly_kpis(user_id, year, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📅 {}", report.month_name);
    println!("{}", RULE);
    print_kpis(
        report.total_income,
        report.total_expense,
        report.monthly_balance,
        report.savings_percent,
    );

    if !report.expenses_by_category.is_empty() {
        println!();
        for category in &report.expenses_by_category {
            println!(
                "   {:25} │ {:>10.2}",
                truncate(&category.category, 25),
                category.total
            );
        }
    }

    Ok(())
}

pub fn cmd_report_balance(
    db: &Database,
    user_id: i64,
    filter: BalanceFilter,
    json: bool,
) -> Result<()> {
    let report = AnalyticsEngine::new(db).balance(user_id, &filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("⚖️  Balance");
    println!("{}", RULE);
    println!("   Income:   {:>12.2}", report.total_income);
    println!("   Expenses: {:>12.2}", report.total_expense);
    println!("   Balance:  {:>12.2}", report.balance);

    Ok(())
}

/// Build a balance filter from CLI flags
pub fn balance_filter(
    day: Option<u32>,
    month: Option<u32>,
    year: Option<i32>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<BalanceFilter> {
    Ok(BalanceFilter {
        day,
        month,
        year,
        range: parse_range_args(from, to)?,
    })
}
