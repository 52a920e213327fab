//! Analytics engine
//!
//! Turns a user's ledger into dashboard reports: KPIs, category breakdowns,
//! zero-filled monthly series, Pareto ranking, an amount histogram and a
//! month × category pivot. The engine only reads through [`LedgerStore`]
//! and never caches, so every report reflects the committed ledger.
//!
//! Degenerate arithmetic never fails:
//! - savings percent is 0 when there is no income
//! - Pareto percentages divide by 1 when total spending is 0

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::db::{LabelTotal, LedgerStore, Scope};
use crate::error::Result;
use crate::models::{
    month_key, month_label, AmountBand, AnalyticsReport, BalanceFilter, BalanceReport,
    CategoryTotal, Kpis, LedgerKind, MonthTotal, MonthlyKpiReport, ParetoEntry, PivotCell,
    ReportFilter,
};

/// Inclusive amount bands of the expense histogram.
/// Amounts outside every band are not counted.
pub const EXPENSE_BANDS: [(i64, i64); 3] = [(0, 100), (101, 500), (501, 1000)];

/// Report builder over a ledger store
pub struct AnalyticsEngine<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
    /// Reference date for "current year/month" defaults
    today: NaiveDate,
}

impl<'a, S: LedgerStore + ?Sized> AnalyticsEngine<'a, S> {
    /// Create an engine whose defaults follow the local calendar
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Pin the reference date used for default year/month
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Build the full analytics report.
    ///
    /// Totals, category lists, Pareto, histogram and pivot honour the filter.
    /// The monthly series always cover the twelve months of the filter's
    /// year, or of the current year when no year is given.
    pub fn report(&self, user_id: i64, filter: &ReportFilter) -> Result<AnalyticsReport> {
        let scope = Scope::from(filter);

        let total_income = self.store.total(LedgerKind::Income, user_id, &scope)?;
        let total_expense = self.store.total(LedgerKind::Expense, user_id, &scope)?;
        let balance = total_income - total_expense;

        let expenses_by_category =
            category_totals(self.store.totals_by_label(LedgerKind::Expense, user_id, &scope)?);
        let income_by_category =
            category_totals(self.store.totals_by_label(LedgerKind::Income, user_id, &scope)?);

        let year = filter.year.unwrap_or_else(|| self.today.year());
        let expenses_by_month = zero_fill_year(
            year,
            &self.store.totals_by_month(LedgerKind::Expense, user_id, year)?,
        );
        let income_by_month = zero_fill_year(
            year,
            &self.store.totals_by_month(LedgerKind::Income, user_id, year)?,
        );
        let monthly_balances = income_by_month
            .iter()
            .zip(&expenses_by_month)
            .map(|(income, expense)| income.total - expense.total)
            .collect();

        let expenses_pareto = pareto(&expenses_by_category);

        let expenses_distribution = EXPENSE_BANDS
            .iter()
            .map(|&(min, max)| {
                let count = self.store.count_in_amount_range(
                    LedgerKind::Expense,
                    user_id,
                    &scope,
                    Decimal::from(min),
                    Decimal::from(max),
                )?;
                Ok(AmountBand {
                    amount_range: format!("{}-{}", min, max),
                    count,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pivot_table = self
            .store
            .totals_by_month_and_label(LedgerKind::Expense, user_id, &scope)?
            .into_iter()
            .map(|row| PivotCell {
                month: month_key(row.year, row.month),
                category: row.label,
                total: row.total,
            })
            .collect();

        debug!(
            user_id,
            year,
            expense_categories = expenses_by_category.len(),
            "Built analytics report"
        );

        Ok(AnalyticsReport {
            kpis: Kpis {
                monthly_balance: balance,
                total_income,
                total_expense,
                savings: balance,
                savings_percent: savings_percent(balance, total_income),
            },
            monthly_balances,
            expenses_by_category,
            income_by_category,
            expenses_by_month,
            income_by_month,
            expenses_pareto,
            expenses_distribution,
            pivot_table,
        })
    }

    /// KPIs for one calendar month (defaults to the current year and month)
    pub fn monthly_kpis(
        &self,
        user_id: i64,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<MonthlyKpiReport> {
        let year = year.unwrap_or_else(|| self.today.year());
        let month = month.unwrap_or_else(|| self.today.month());
        let scope = Scope::new().year(Some(year)).month(Some(month));

        let total_income = self.store.total(LedgerKind::Income, user_id, &scope)?;
        let total_expense = self.store.total(LedgerKind::Expense, user_id, &scope)?;
        let balance = total_income - total_expense;
        let expenses_by_category =
            category_totals(self.store.totals_by_label(LedgerKind::Expense, user_id, &scope)?);

        Ok(MonthlyKpiReport {
            year,
            month,
            month_name: month_label(year, month),
            monthly_balance: balance,
            total_income,
            total_expense,
            savings: balance,
            savings_percent: savings_percent(balance, total_income),
            expenses_by_category,
        })
    }

    /// Income, expense and balance for a calendar selection or a date range
    pub fn balance(&self, user_id: i64, filter: &BalanceFilter) -> Result<BalanceReport> {
        let scope = Scope::from(filter);

        let total_income = self.store.total(LedgerKind::Income, user_id, &scope)?;
        let total_expense = self.store.total(LedgerKind::Expense, user_id, &scope)?;

        Ok(BalanceReport {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            filters: filter.into(),
        })
    }
}

fn category_totals(rows: Vec<LabelTotal>) -> Vec<CategoryTotal> {
    rows.into_iter()
        .map(|row| CategoryTotal {
            category: row.label,
            total: row.total,
        })
        .collect()
}

/// Balance as a percentage of income, rounded to 2 places; 0 without income
pub fn savings_percent(balance: Decimal, total_income: Decimal) -> Decimal {
    if total_income.is_zero() {
        return Decimal::ZERO;
    }
    (balance / total_income * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Expand sparse (month, total) rows into the twelve months of `year`
pub fn zero_fill_year(year: i32, rows: &[(u32, Decimal)]) -> Vec<MonthTotal> {
    let by_month: HashMap<u32, Decimal> = rows.iter().copied().collect();

    (1..=12)
        .map(|month| MonthTotal {
            month: month_key(year, month),
            month_name: month_label(year, month),
            total: by_month.get(&month).copied().unwrap_or(Decimal::ZERO),
        })
        .collect()
}

/// Rank categories by total (descending, ties by name) with running share
/// of the grand total, rounded to 1 place
pub fn pareto(categories: &[CategoryTotal]) -> Vec<ParetoEntry> {
    let mut ranked: Vec<&CategoryTotal> = categories.iter().collect();
    ranked.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    let grand_total: Decimal = ranked.iter().map(|c| c.total).sum();
    let denominator = if grand_total.is_zero() {
        Decimal::ONE
    } else {
        grand_total
    };

    let mut cumulative = Decimal::ZERO;
    ranked
        .into_iter()
        .map(|c| {
            cumulative += c.total;
            ParetoEntry {
                category: c.category.clone(),
                total: c.total,
                cumulative_percent: (cumulative / denominator * Decimal::ONE_HUNDRED).round_dp(1),
            }
        })
        .collect()
}
