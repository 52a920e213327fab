//! Domain models for Finsight

use chrono::{DateTime, Datelike, Month, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Timestamp format used for ledger dates in the store
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The two record collections that make up a user's ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Income,
    Expense,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Backing table name
    pub(crate) fn table(&self) -> &'static str {
        match self {
            Self::Income => "incomes",
            Self::Expense => "expenses",
        }
    }

    /// Column used when grouping totals by label.
    /// Incomes group by where the money came from, expenses by category.
    pub(crate) fn label_column(&self) -> &'static str {
        match self {
            Self::Income => "source",
            Self::Expense => "category",
        }
    }
}

impl std::str::FromStr for LedgerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "incomes" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(format!("Unknown ledger kind: {}", s)),
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Owner of ledger records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A recorded income
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    pub user_id: i64,
    /// Where the money came from (employer, client, ...)
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    pub observations: Option<String>,
    pub date: NaiveDateTime,
    /// "YYYY-MM", derived from `date` on every write
    pub month: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Income fields supplied by the caller (before DB insertion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncome {
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub observations: Option<String>,
    pub date: NaiveDateTime,
}

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: String,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    /// "YYYY-MM", derived from `date` on every write
    pub month: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

/// Expense fields supplied by the caller (before DB insertion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDateTime,
}

/// Derive the "YYYY-MM" month label stored alongside each record
pub fn derive_month(date: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// English month name for a 1-based month number ("" when out of range)
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("")
}

/// Display label for a calendar month, e.g. "March 2024"
pub fn month_label(year: i32, month: u32) -> String {
    format!("{} {}", month_name(month), year)
}

/// "YYYY-MM" key for a calendar month
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

// ========== Filters ==========

/// Inclusive timestamp range; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// True when neither bound is set
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Filter for the full analytics report.
/// A non-empty range wins over `year`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub year: Option<i32>,
    pub range: DateRange,
}

impl ReportFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            range: DateRange::default(),
        }
    }

    pub fn range(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self {
            year: None,
            range: DateRange::new(start, end),
        }
    }
}

/// Filter for the balance-only report: discrete calendar fields or a range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceFilter {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub range: DateRange,
}

// ========== Report Models ==========

fn decimals_as_floats<S>(values: &[Decimal], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(values.iter().map(|v| v.to_f64().unwrap_or(0.0)))
}

/// Headline figures for a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings_percent: Decimal,
}

/// Total for one category (or income source)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Total for one calendar month of a zero-filled year
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub month: String,
    pub month_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Pareto-ranked expense category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoEntry {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cumulative_percent: Decimal,
}

/// Number of expenses inside one amount band
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountBand {
    pub amount_range: String,
    pub count: i64,
}

/// One month × category cell of the pivot table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotCell {
    pub month: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Full analytics report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub kpis: Kpis,
    #[serde(serialize_with = "decimals_as_floats")]
    pub monthly_balances: Vec<Decimal>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    pub expenses_by_month: Vec<MonthTotal>,
    pub income_by_month: Vec<MonthTotal>,
    pub expenses_pareto: Vec<ParetoEntry>,
    pub expenses_distribution: Vec<AmountBand>,
    pub pivot_table: Vec<PivotCell>,
}

/// KPIs for a single calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyKpiReport {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub savings_percent: Decimal,
    pub expenses_by_category: Vec<CategoryTotal>,
}

/// Echo of the filter applied to a balance report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceFilterEcho {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl From<&BalanceFilter> for BalanceFilterEcho {
    fn from(filter: &BalanceFilter) -> Self {
        Self {
            day: filter.day,
            month: filter.month,
            year: filter.year,
            start_date: filter.range.start,
            end_date: filter.range.end,
        }
    }
}

/// Totals and balance for a filtered period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub filters: BalanceFilterEcho,
}
