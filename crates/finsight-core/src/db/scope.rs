//! Scope builder for constructing ledger query filters
//!
//! A `Scope` is the store-level shape of every report filter: an optional
//! inclusive timestamp range plus optional calendar-field equality on the
//! record date. It renders to a SQL condition fragment and matching params.

use chrono::NaiveDateTime;

use crate::models::{BalanceFilter, DateRange, ReportFilter, DATE_TIME_FORMAT};

/// Store-level filter over ledger record dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    pub range: DateRange,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// Rendered scope - SQL conditions and their parameters
pub struct ScopeClause {
    /// Conditions joined with AND, each prefixed by "AND " (empty if none)
    pub conditions: String,
    /// Parameters for the conditions, in order
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl Scope {
    /// Unfiltered scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Set inclusive date range
    pub fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Restrict to a calendar year
    pub fn year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Restrict to a calendar month (1-12, any year unless `year` is set)
    pub fn month(mut self, month: Option<u32>) -> Self {
        self.month = month;
        self
    }

    /// Restrict to a day of month (1-31)
    pub fn day(mut self, day: Option<u32>) -> Self {
        self.day = day;
        self
    }

    /// Render the scope for a table aliased as `alias`
    pub fn build(&self, alias: &str) -> ScopeClause {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = self.range.start {
            conditions.push(format!("{}.date >= ?", alias));
            params.push(Box::new(format_timestamp(&start)));
        }
        if let Some(end) = self.range.end {
            conditions.push(format!("{}.date <= ?", alias));
            params.push(Box::new(format_timestamp(&end)));
        }

        if let Some(year) = self.year {
            conditions.push(format!("CAST(strftime('%Y', {}.date) AS INTEGER) = ?", alias));
            params.push(Box::new(year));
        }
        if let Some(month) = self.month {
            conditions.push(format!("CAST(strftime('%m', {}.date) AS INTEGER) = ?", alias));
            params.push(Box::new(month));
        }
        if let Some(day) = self.day {
            conditions.push(format!("CAST(strftime('%d', {}.date) AS INTEGER) = ?", alias));
            params.push(Box::new(day));
        }

        let conditions = conditions
            .iter()
            .map(|c| format!("AND {}", c))
            .collect::<Vec<_>>()
            .join(" ");

        ScopeClause { conditions, params }
    }
}

impl From<&ReportFilter> for Scope {
    fn from(filter: &ReportFilter) -> Self {
        if filter.range.is_empty() {
            Scope::new().year(filter.year)
        } else {
            Scope::new().range(filter.range)
        }
    }
}

impl From<&BalanceFilter> for Scope {
    fn from(filter: &BalanceFilter) -> Self {
        if filter.range.is_empty() {
            Scope::new()
                .year(filter.year)
                .month(filter.month)
                .day(filter.day)
        } else {
            Scope::new().range(filter.range)
        }
    }
}

/// Format a timestamp the way ledger dates are stored
pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DATE_TIME_FORMAT).to_string()
}
