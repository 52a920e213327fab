//! Read-only aggregate queries over the ledger
//!
//! `LedgerStore` is the query surface the analytics engine depends on.
//! `Database` implements it with SQLite: calendar fields come from
//! `strftime`, sums are integer sums over cents. Archived records are never
//! visible here.

use rust_decimal::Decimal;

use super::scope::Scope;
use super::Database;
use crate::error::Result;
use crate::models::LedgerKind;
use crate::money::{from_cents, to_cents};

/// Sum of amounts for one label (expense category or income source)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTotal {
    pub label: String,
    pub total: Decimal,
}

/// Sum of amounts for one (year, month, label) group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: Decimal,
}

/// Aggregate queries over one user's ledger
pub trait LedgerStore {
    /// Sum of amounts in scope (zero when nothing matches)
    fn total(&self, kind: LedgerKind, user_id: i64, scope: &Scope) -> Result<Decimal>;

    /// Sums grouped by label, ordered by label
    fn totals_by_label(
        &self,
        kind: LedgerKind,
        user_id: i64,
        scope: &Scope,
    ) -> Result<Vec<LabelTotal>>;

    /// Sums per calendar month of `year`; months without records are absent
    fn totals_by_month(
        &self,
        kind: LedgerKind,
        user_id: i64,
        year: i32,
    ) -> Result<Vec<(u32, Decimal)>>;

    /// Number of records in scope whose amount lies in `[min, max]`
    fn count_in_amount_range(
        &self,
        kind: LedgerKind,
        user_id: i64,
        scope: &Scope,
        min: Decimal,
        max: Decimal,
    ) -> Result<i64>;

    /// Sums grouped by (year, month, label), ordered by all three
    fn totals_by_month_and_label(
        &self,
        kind: LedgerKind,
        user_id: i64,
        scope: &Scope,
    ) -> Result<Vec<PivotRow>>;
}

/// Prepend the user id to the scope params
fn scoped_params(
    user_id: i64,
    scope_params: Vec<Box<dyn rusqlite::ToSql>>,
) -> Vec<Box<dyn rusqlite::ToSql>> {
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];
    params.extend(scope_params);
    params
}

impl LedgerStore for Database {
    fn total(&self, kind: LedgerKind, user_id: i64, scope: &Scope) -> Result<Decimal> {
        let conn = self.conn()?;
        let clause = scope.build("r");

        let sql = format!(
            "SELECT COALESCE(SUM(r.amount_cents), 0) FROM {} r WHERE r.user_id = ? AND r.archived = 0 {}",
            kind.table(),
            clause.conditions
        );
        let params = scoped_params(user_id, clause.params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let cents: i64 = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;
        Ok(from_cents(cents))
    }

    fn totals_by_label(
        &self,
        kind: LedgerKind,
        user_id: i64,
        scope: &Scope,
    ) -> Result<Vec<LabelTotal>> {
        let conn = self.conn()?;
        let clause = scope.build("r");
        let label = kind.label_column();

        let sql = format!(
            r#"
            SELECT r.{label}, SUM(r.amount_cents)
            FROM {table} r
            WHERE r.user_id = ? AND r.archived = 0 {conditions}
            GROUP BY r.{label}
            ORDER BY r.{label}
            "#,
            label = label,
            table = kind.table(),
            conditions = clause.conditions
        );
        let params = scoped_params(user_id, clause.params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok(LabelTotal {
                    label: row.get(0)?,
                    total: from_cents(row.get(1)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn totals_by_month(
        &self,
        kind: LedgerKind,
        user_id: i64,
        year: i32,
    ) -> Result<Vec<(u32, Decimal)>> {
        let conn = self.conn()?;
        let clause = Scope::new().year(Some(year)).build("r");

        let sql = format!(
            r#"
            SELECT CAST(strftime('%m', r.date) AS INTEGER) AS m, SUM(r.amount_cents)
            FROM {} r
            WHERE r.user_id = ? AND r.archived = 0 {}
            GROUP BY m
            ORDER BY m
            "#,
            kind.table(),
            clause.conditions
        );
        let params = scoped_params(user_id, clause.params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok((row.get::<_, u32>(0)?, from_cents(row.get(1)?)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_in_amount_range(
        &self,
        kind: LedgerKind,
        user_id: i64,
        scope: &Scope,
        min: Decimal,
        max: Decimal,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let clause = scope.build("r");

        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM {} r
            WHERE r.user_id = ? AND r.archived = 0
              AND r.amount_cents >= ? AND r.amount_cents <= ? {}
            "#,
            kind.table(),
            clause.conditions
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![
            Box::new(user_id),
            Box::new(to_cents(min)?),
            Box::new(to_cents(max)?),
        ];
        params.extend(clause.params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    fn totals_by_month_and_label(
        &self,
        kind: LedgerKind,
        user_id: i64,
        scope: &Scope,
    ) -> Result<Vec<PivotRow>> {
        let conn = self.conn()?;
        let clause = scope.build("r");
        let label = kind.label_column();

        let sql = format!(
            r#"
            SELECT
                CAST(strftime('%Y', r.date) AS INTEGER) AS y,
                CAST(strftime('%m', r.date) AS INTEGER) AS m,
                r.{label},
                SUM(r.amount_cents)
            FROM {table} r
            WHERE r.user_id = ? AND r.archived = 0 {conditions}
            GROUP BY y, m, r.{label}
            ORDER BY y, m, r.{label}
            "#,
            label = label,
            table = kind.table(),
            conditions = clause.conditions
        );
        let params = scoped_params(user_id, clause.params);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok(PivotRow {
                    year: row.get(0)?,
                    month: row.get(1)?,
                    label: row.get(2)?,
                    total: from_cents(row.get(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
