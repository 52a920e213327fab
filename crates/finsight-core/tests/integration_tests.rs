//! Integration tests for finsight-core
//!
//! These tests exercise the record → aggregate → report workflow against a
//! real SQLite database.

use chrono::{NaiveDate, NaiveDateTime};
use finsight_core::{
    db::Database,
    models::{BalanceFilter, DateRange, NewExpense, NewIncome, ReportFilter},
    AnalyticsEngine,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn day_start(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn day_end(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(23, 59, 59)
        .unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn add_income(db: &Database, user: i64, source: &str, amount: &str, date: NaiveDateTime) {
    db.insert_income(
        user,
        &NewIncome {
            source: source.to_string(),
            amount: dec(amount),
            category: "Work".to_string(),
            observations: None,
            date,
        },
    )
    .expect("Failed to insert income");
}

fn add_expense(db: &Database, user: i64, category: &str, amount: &str, date: NaiveDateTime) -> i64 {
    db.insert_expense(
        user,
        &NewExpense {
            amount: dec(amount),
            payment_method: "debit".to_string(),
            category: category.to_string(),
            description: None,
            date,
        },
    )
    .expect("Failed to insert expense")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

// =============================================================================
// Analytics Report
// =============================================================================

#[test]
fn test_report_for_year() {
    let db = Database::in_memory().expect("Failed to create database");
    let user = db.ensure_user("alice").unwrap();

    add_income(&db, user, "Acme", "100", at(2024, 1, 10));
    add_income(&db, user, "Acme", "200", at(2024, 2, 10));
    add_expense(&db, user, "Food", "50", at(2024, 1, 20));

    let engine = AnalyticsEngine::new(&db).as_of(today());
    let report = engine.report(user, &ReportFilter::year(2024)).unwrap();

    assert_eq!(report.kpis.total_income, dec("300"));
    assert_eq!(report.kpis.total_expense, dec("50"));
    assert_eq!(report.kpis.monthly_balance, dec("250"));
    assert_eq!(report.kpis.savings, dec("250"));
    assert_eq!(report.kpis.savings_percent, dec("83.33"));

    assert_eq!(report.monthly_balances.len(), 12);
    assert_eq!(report.monthly_balances[0], dec("50"));
    assert_eq!(report.monthly_balances[1], dec("200"));
    assert!(report.monthly_balances[2..].iter().all(|b| b.is_zero()));

    assert_eq!(report.income_by_month[0].month, "2024-01");
    assert_eq!(report.income_by_month[0].month_name, "January 2024");
    assert_eq!(report.income_by_month[1].total, dec("200"));
    assert_eq!(report.expenses_by_month[0].total, dec("50"));

    assert_eq!(report.income_by_category.len(), 1);
    assert_eq!(report.income_by_category[0].category, "Acme");

    assert_eq!(report.expenses_pareto.len(), 1);
    assert_eq!(report.expenses_pareto[0].cumulative_percent, dec("100"));

    assert_eq!(report.pivot_table.len(), 1);
    assert_eq!(report.pivot_table[0].month, "2024-01");
    assert_eq!(report.pivot_table[0].category, "Food");
}

#[test]
fn test_report_for_user_without_records() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("empty").unwrap();

    let report = AnalyticsEngine::new(&db)
        .as_of(today())
        .report(user, &ReportFilter::all())
        .unwrap();

    assert_eq!(report.kpis.total_income, Decimal::ZERO);
    assert_eq!(report.kpis.total_expense, Decimal::ZERO);
    assert_eq!(report.kpis.savings_percent, Decimal::ZERO);
    assert!(report.expenses_by_category.is_empty());
    assert!(report.income_by_category.is_empty());
    assert!(report.expenses_pareto.is_empty());
    assert!(report.pivot_table.is_empty());

    // Series follow the reference year when no year is given
    assert_eq!(report.expenses_by_month.len(), 12);
    assert_eq!(report.expenses_by_month[0].month, "2024-01");
    assert!(report.monthly_balances.iter().all(|b| b.is_zero()));

    let counts: Vec<i64> = report.expenses_distribution.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![0, 0, 0]);
}

#[test]
fn test_expense_distribution_bands() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_expense(&db, user, "Food", "50", at(2024, 3, 1));
    add_expense(&db, user, "Travel", "150", at(2024, 3, 2));
    add_expense(&db, user, "Rent", "600", at(2024, 3, 3));
    add_expense(&db, user, "Car", "2500", at(2024, 3, 4));

    let report = AnalyticsEngine::new(&db)
        .as_of(today())
        .report(user, &ReportFilter::all())
        .unwrap();

    let bands: Vec<(&str, i64)> = report
        .expenses_distribution
        .iter()
        .map(|b| (b.amount_range.as_str(), b.count))
        .collect();
    assert_eq!(bands, vec![("0-100", 1), ("101-500", 1), ("501-1000", 1)]);
}

#[test]
fn test_pareto_over_stored_categories() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_expense(&db, user, "Food", "30", at(2024, 2, 1));
    add_expense(&db, user, "Rent", "50", at(2024, 2, 1));
    add_expense(&db, user, "Rent", "10", at(2024, 3, 1));
    add_expense(&db, user, "Fun", "10", at(2024, 3, 5));

    let report = AnalyticsEngine::new(&db)
        .as_of(today())
        .report(user, &ReportFilter::year(2024))
        .unwrap();

    let ranked: Vec<(&str, Decimal)> = report
        .expenses_pareto
        .iter()
        .map(|e| (e.category.as_str(), e.cumulative_percent))
        .collect();
    assert_eq!(
        ranked,
        vec![("Rent", dec("60")), ("Food", dec("90")), ("Fun", dec("100"))]
    );

    // Category list stays in label order
    let names: Vec<&str> = report
        .expenses_by_category
        .iter()
        .map(|c| c.category.as_str())
        .collect();
    assert_eq!(names, vec!["Food", "Fun", "Rent"]);
}

#[test]
fn test_range_takes_precedence_over_year() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_income(&db, user, "Acme", "100", at(2023, 12, 31));
    add_income(&db, user, "Acme", "200", at(2024, 1, 15));
    add_income(&db, user, "Acme", "400", at(2024, 2, 15));

    let filter = ReportFilter {
        year: Some(2023),
        range: DateRange::new(Some(day_start(2024, 1, 1)), Some(day_end(2024, 1, 31))),
    };
    let report = AnalyticsEngine::new(&db)
        .as_of(today())
        .report(user, &filter)
        .unwrap();

    assert_eq!(report.kpis.total_income, dec("200"));
    // Monthly series still follow the given year
    assert_eq!(report.income_by_month[11].month, "2023-12");
    assert_eq!(report.income_by_month[11].total, dec("100"));
}

#[test]
fn test_archived_expense_leaves_reports() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_expense(&db, user, "Food", "40", at(2024, 4, 1));
    let id = add_expense(&db, user, "Travel", "700", at(2024, 4, 2));

    let engine = AnalyticsEngine::new(&db).as_of(today());
    let before = engine.report(user, &ReportFilter::year(2024)).unwrap();
    assert_eq!(before.kpis.total_expense, dec("740"));

    db.archive_expense(user, id).unwrap();

    let after = engine.report(user, &ReportFilter::year(2024)).unwrap();
    assert_eq!(after.kpis.total_expense, dec("40"));
    assert_eq!(after.expenses_by_category.len(), 1);
    assert_eq!(after.pivot_table.len(), 1);
    assert_eq!(after.expenses_distribution[2].count, 0);
}

#[test]
fn test_users_never_see_each_other() {
    let db = Database::in_memory().unwrap();
    let alice = db.ensure_user("alice").unwrap();
    let bob = db.ensure_user("bob").unwrap();

    add_income(&db, alice, "Acme", "1000", at(2024, 5, 1));
    add_expense(&db, bob, "Food", "20", at(2024, 5, 1));

    let engine = AnalyticsEngine::new(&db).as_of(today());
    let report = engine.report(alice, &ReportFilter::all()).unwrap();
    assert_eq!(report.kpis.total_income, dec("1000"));
    assert_eq!(report.kpis.total_expense, Decimal::ZERO);
    assert_eq!(report.kpis.savings_percent, dec("100"));
}

// =============================================================================
// Monthly KPIs
// =============================================================================

#[test]
fn test_monthly_kpis_for_explicit_month() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_income(&db, user, "Acme", "1000", at(2024, 3, 1));
    add_expense(&db, user, "Rent", "600", at(2024, 3, 2));
    add_expense(&db, user, "Food", "150", at(2024, 3, 20));
    add_expense(&db, user, "Food", "999", at(2024, 4, 1));

    let report = AnalyticsEngine::new(&db)
        .as_of(today())
        .monthly_kpis(user, Some(2024), Some(3))
        .unwrap();

    assert_eq!(report.year, 2024);
    assert_eq!(report.month, 3);
    assert_eq!(report.month_name, "March 2024");
    assert_eq!(report.total_income, dec("1000"));
    assert_eq!(report.total_expense, dec("750"));
    assert_eq!(report.monthly_balance, dec("250"));
    assert_eq!(report.savings_percent, dec("25"));
    assert_eq!(report.expenses_by_category.len(), 2);
}

#[test]
fn test_monthly_kpis_default_to_reference_month() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_expense(&db, user, "Food", "12.34", at(2024, 6, 1));

    let report = AnalyticsEngine::new(&db)
        .as_of(today())
        .monthly_kpis(user, None, None)
        .unwrap();

    assert_eq!((report.year, report.month), (2024, 6));
    assert_eq!(report.month_name, "June 2024");
    assert_eq!(report.total_expense, dec("12.34"));
    assert_eq!(report.savings_percent, Decimal::ZERO);
}

// =============================================================================
// Balance
// =============================================================================

#[test]
fn test_balance_by_calendar_fields_and_range() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_income(&db, user, "Acme", "500", at(2024, 1, 5));
    add_income(&db, user, "Acme", "300", at(2024, 2, 5));
    add_expense(&db, user, "Food", "80", at(2024, 1, 5));
    add_expense(&db, user, "Food", "20", at(2024, 1, 6));

    let engine = AnalyticsEngine::new(&db).as_of(today());

    let by_day = BalanceFilter {
        day: Some(5),
        ..Default::default()
    };
    let report = engine.balance(user, &by_day).unwrap();
    assert_eq!(report.total_income, dec("800"));
    assert_eq!(report.total_expense, dec("80"));
    assert_eq!(report.balance, dec("720"));
    assert_eq!(report.filters.day, Some(5));

    let by_month = BalanceFilter {
        month: Some(1),
        year: Some(2024),
        ..Default::default()
    };
    let report = engine.balance(user, &by_month).unwrap();
    assert_eq!(report.balance, dec("400"));

    let ranged = BalanceFilter {
        year: Some(1999),
        range: DateRange::new(Some(day_start(2024, 1, 6)), None),
        ..Default::default()
    };
    let report = engine.balance(user, &ranged).unwrap();
    assert_eq!(report.total_income, dec("300"));
    assert_eq!(report.total_expense, dec("20"));
    assert_eq!(report.filters.year, Some(1999));
    assert_eq!(report.filters.start_date, Some(day_start(2024, 1, 6)));
}

#[test]
fn test_balance_can_be_negative() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice").unwrap();

    add_expense(&db, user, "Rent", "900", at(2024, 1, 1));

    let report = AnalyticsEngine::new(&db)
        .balance(user, &BalanceFilter::default())
        .unwrap();
    assert_eq!(report.balance, dec("-900"));
}
