//! Expense operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::scope::{format_timestamp, Scope};
use super::{ledger_date, timestamp_column, Database, Page};
use crate::error::{Error, Result};
use crate::models::{derive_month, DateRange, Expense, NewExpense};
use crate::money::{from_cents, to_cents};

const EXPENSE_COLUMNS: &str = "e.id, e.user_id, e.amount_cents, e.payment_method, e.category, e.description, e.date, e.month, e.archived, e.created_at";

fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: from_cents(row.get(2)?),
        payment_method: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date: ledger_date(row, 6)?,
        month: row.get(7)?,
        archived: row.get(8)?,
        created_at: timestamp_column(row, 9)?,
    })
}

fn validate(expense: &NewExpense) -> Result<i64> {
    if expense.category.trim().is_empty() {
        return Err(Error::InvalidData("Expense category must not be empty".to_string()));
    }
    if expense.payment_method.trim().is_empty() {
        return Err(Error::InvalidData(
            "Expense payment method must not be empty".to_string(),
        ));
    }
    to_cents(expense.amount)
}

impl Database {
    /// Record an expense for `user_id`, returning the new id
    pub fn insert_expense(&self, user_id: i64, expense: &NewExpense) -> Result<i64> {
        let cents = validate(expense)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO expenses (user_id, amount_cents, payment_method, category, description, date, month)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                cents,
                expense.payment_method.trim(),
                expense.category.trim(),
                expense.description,
                format_timestamp(&expense.date),
                derive_month(&expense.date),
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!(user_id, expense_id = id, "Recorded expense");
        Ok(id)
    }

    /// Fetch one of the user's expenses (archived ones included)
    pub fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM expenses e WHERE e.id = ? AND e.user_id = ?",
            EXPENSE_COLUMNS
        );
        let expense = conn
            .query_row(&sql, params![id, user_id], row_to_expense)
            .optional()?;
        Ok(expense)
    }

    /// List the user's active expenses, newest first
    pub fn list_expenses(
        &self,
        user_id: i64,
        range: &DateRange,
        page: Page,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let clause = Scope::new().range(*range).build("e");

        let sql = format!(
            r#"
            SELECT {}
            FROM expenses e
            WHERE e.user_id = ? AND e.archived = 0 {}
            ORDER BY e.date DESC, e.id DESC
            LIMIT ? OFFSET ?
            "#,
            EXPENSE_COLUMNS, clause.conditions
        );

        let mut query_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];
        query_params.extend(clause.params);
        query_params.push(Box::new(page.limit));
        query_params.push(Box::new(page.offset));
        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(param_refs.as_slice(), row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(expenses)
    }

    /// Replace the fields of an expense; the stored month is re-derived
    pub fn update_expense(&self, user_id: i64, id: i64, expense: &NewExpense) -> Result<()> {
        let cents = validate(expense)?;
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE expenses
            SET amount_cents = ?, payment_method = ?, category = ?, description = ?, date = ?, month = ?
            WHERE id = ? AND user_id = ?
            "#,
            params![
                cents,
                expense.payment_method.trim(),
                expense.category.trim(),
                expense.description,
                format_timestamp(&expense.date),
                derive_month(&expense.date),
                id,
                user_id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        info!(user_id, expense_id = id, "Updated expense");
        Ok(())
    }

    /// Hide an expense from reports and listings
    pub fn archive_expense(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE expenses SET archived = 1 WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        Ok(())
    }

    /// Permanently remove an expense
    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM expenses WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        info!(user_id, expense_id = id, "Deleted expense");
        Ok(())
    }
}
