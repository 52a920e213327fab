//! Income and expense commands

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use finsight_core::db::Database;
use finsight_core::models::{NewExpense, NewIncome};
use finsight_core::Page;
use rust_decimal::Decimal;

use super::{parse_date_arg, parse_range_args, truncate};

fn record_date(date: Option<&str>) -> Result<NaiveDateTime> {
    match date {
        Some(value) => parse_date_arg(value, "--date", false),
        None => Ok(Local::now().naive_local()),
    }
}

fn list_page(limit: i64) -> Page {
    Page {
        limit: limit.clamp(1, finsight_server::MAX_PAGE_LIMIT),
        offset: 0,
    }
}

pub fn cmd_income_add(
    db: &Database,
    user_id: i64,
    source: &str,
    amount: Decimal,
    category: &str,
    date: Option<&str>,
    observations: Option<&str>,
) -> Result<i64> {
    let income = NewIncome {
        source: source.to_string(),
        amount,
        category: category.to_string(),
        observations: observations.map(str::to_string),
        date: record_date(date)?,
    };
    let id = db.insert_income(user_id, &income)?;

    println!(
        "✅ Recorded income #{}: {} from {} ({})",
        id, amount, source, category
    );
    Ok(id)
}

pub fn cmd_income_list(
    db: &Database,
    user_id: i64,
    from: Option<&str>,
    to: Option<&str>,
    limit: i64,
) -> Result<()> {
    let range = parse_range_args(from, to)?;
    let incomes = db.list_incomes(user_id, &range, list_page(limit))?;

    if incomes.is_empty() {
        println!("No incomes found. Add one with:");
        println!("  finsight income add --source <name> --amount <n> --category <c>");
        return Ok(());
    }

    println!();
    println!(
        "   {:>5} │ {:10} │ {:20} │ {:15} │ {:>10}",
        "ID", "Date", "Source", "Category", "Amount"
    );
    println!("   ──────┼────────────┼──────────────────────┼─────────────────┼────────────");
    for income in &incomes {
        println!(
            "   {:>5} │ {:10} │ {:20} │ {:15} │ {:>10.2}",
            income.id,
            income.date.format("%Y-%m-%d").to_string(),
            truncate(&income.source, 20),
            truncate(&income.category, 15),
            income.amount
        );
    }
    println!();
    println!("   {} income(s)", incomes.len());

    Ok(())
}

pub fn cmd_income_archive(db: &Database, user_id: i64, id: i64) -> Result<()> {
    db.archive_income(user_id, id)?;
    println!("📦 Archived income #{}", id);
    Ok(())
}

pub fn cmd_income_delete(db: &Database, user_id: i64, id: i64) -> Result<()> {
    db.delete_income(user_id, id)?;
    println!("🗑️  Deleted income #{}", id);
    Ok(())
}

pub fn cmd_expense_add(
    db: &Database,
    user_id: i64,
    amount: Decimal,
    category: &str,
    payment_method: &str,
    date: Option<&str>,
    description: Option<&str>,
) -> Result<i64> {
    let expense = NewExpense {
        amount,
        payment_method: payment_method.to_string(),
        category: category.to_string(),
        description: description.map(str::to_string),
        date: record_date(date)?,
    };
    let id = db.insert_expense(user_id, &expense)?;

    println!(
        "✅ Recorded expense #{}: {} on {} ({})",
        id, amount, category, payment_method
    );
    Ok(id)
}

pub fn cmd_expense_list(
    db: &Database,
    user_id: i64,
    from: Option<&str>,
    to: Option<&str>,
    limit: i64,
) -> Result<()> {
    let range = parse_range_args(from, to)?;
    let expenses = db.list_expenses(user_id, &range, list_page(limit))?;

    if expenses.is_empty() {
        println!("No expenses found. Add one with:");
        println!("  finsight expense add --amount <n> --category <c> --payment-method <m>");
        return Ok(());
    }

    println!();
    println!(
        "   {:>5} │ {:10} │ {:15} │ {:12} │ {:>10}",
        "ID", "Date", "Category", "Paid with", "Amount"
    );
    println!("   ──────┼────────────┼─────────────────┼──────────────┼────────────");
    for expense in &expenses {
        println!(
            "   {:>5} │ {:10} │ {:15} │ {:12} │ {:>10.2}",
            expense.id,
            expense.date.format("%Y-%m-%d").to_string(),
            truncate(&expense.category, 15),
            truncate(&expense.payment_method, 12),
            expense.amount
        );
    }
    println!();
    println!("   {} expense(s)", expenses.len());

    Ok(())
}

pub fn cmd_expense_archive(db: &Database, user_id: i64, id: i64) -> Result<()> {
    db.archive_expense(user_id, id)?;
    println!("📦 Archived expense #{}", id);
    Ok(())
}

pub fn cmd_expense_delete(db: &Database, user_id: i64, id: i64) -> Result<()> {
    db.delete_expense(user_id, id)?;
    println!("🗑️  Deleted expense #{}", id);
    Ok(())
}
