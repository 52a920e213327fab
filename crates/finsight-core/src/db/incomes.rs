//! Income operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::scope::{format_timestamp, Scope};
use super::{ledger_date, timestamp_column, Database, Page};
use crate::error::{Error, Result};
use crate::models::{derive_month, DateRange, Income, NewIncome};
use crate::money::{from_cents, to_cents};

const INCOME_COLUMNS: &str = "i.id, i.user_id, i.source, i.amount_cents, i.category, i.observations, i.date, i.month, i.archived, i.created_at";

fn row_to_income(row: &rusqlite::Row<'_>) -> rusqlite::Result<Income> {
    Ok(Income {
        id: row.get(0)?,
        user_id: row.get(1)?,
        source: row.get(2)?,
        amount: from_cents(row.get(3)?),
        category: row.get(4)?,
        observations: row.get(5)?,
        date: ledger_date(row, 6)?,
        month: row.get(7)?,
        archived: row.get(8)?,
        created_at: timestamp_column(row, 9)?,
    })
}

fn validate(income: &NewIncome) -> Result<i64> {
    if income.source.trim().is_empty() {
        return Err(Error::InvalidData("Income source must not be empty".to_string()));
    }
    if income.category.trim().is_empty() {
        return Err(Error::InvalidData("Income category must not be empty".to_string()));
    }
    to_cents(income.amount)
}

impl Database {
    /// Record an income for `user_id`, returning the new id
    pub fn insert_income(&self, user_id: i64, income: &NewIncome) -> Result<i64> {
        let cents = validate(income)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO incomes (user_id, source, amount_cents, category, observations, date, month)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                income.source.trim(),
                cents,
                income.category.trim(),
                income.observations,
                format_timestamp(&income.date),
                derive_month(&income.date),
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!(user_id, income_id = id, "Recorded income");
        Ok(id)
    }

    /// Fetch one of the user's incomes (archived ones included)
    pub fn get_income(&self, user_id: i64, id: i64) -> Result<Option<Income>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM incomes i WHERE i.id = ? AND i.user_id = ?",
            INCOME_COLUMNS
        );
        let income = conn
            .query_row(&sql, params![id, user_id], row_to_income)
            .optional()?;
        Ok(income)
    }

    /// List the user's active incomes, newest first
    pub fn list_incomes(&self, user_id: i64, range: &DateRange, page: Page) -> Result<Vec<Income>> {
        let conn = self.conn()?;
        let clause = Scope::new().range(*range).build("i");

        let sql = format!(
            r#"
            SELECT {}
            FROM incomes i
            WHERE i.user_id = ? AND i.archived = 0 {}
            ORDER BY i.date DESC, i.id DESC
            LIMIT ? OFFSET ?
            "#,
            INCOME_COLUMNS, clause.conditions
        );

        let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];
        query_params.extend(clause.params);
        query_params.push(Box::new(page.limit));
        query_params.push(Box::new(page.offset));
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let incomes = stmt
            .query_map(param_refs.as_slice(), row_to_income)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(incomes)
    }

    /// Replace the fields of an income; the stored month is re-derived
    pub fn update_income(&self, user_id: i64, id: i64, income: &NewIncome) -> Result<()> {
        let cents = validate(income)?;
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE incomes
            SET source = ?, amount_cents = ?, category = ?, observations = ?, date = ?, month = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                income.source.trim(),
                cents,
                income.category.trim(),
                income.observations,
                format_timestamp(&income.date),
                derive_month(&income.date),
                id,
                user_id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Income {}", id)));
        }
        info!(user_id, income_id = id, "Updated income");
        Ok(())
    }

    /// Hide an income from reports and listings
    pub fn archive_income(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE incomes SET archived = 1 WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Income {}", id)));
        }
        Ok(())
    }

    /// Permanently remove an income
    pub fn delete_income(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM incomes WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Income {}", id)));
        }
        info!(user_id, income_id = id, "Deleted income");
        Ok(())
    }
}
