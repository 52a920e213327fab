//! Ledger owner operations

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{timestamp_column, Database};
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Return the id of `username`, creating the user on first sight
    pub fn ensure_user(&self, username: &str) -> Result<i64> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidData("Username must not be empty".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?)",
            params![username],
        )?;
        if conn.changes() > 0 {
            debug!(username, "Created user");
        }

        let id = conn.query_row(
            "SELECT id FROM users WHERE username = ?",
            params![username],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Look up a user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, username, is_active, created_at FROM users WHERE username = ?",
                params![username.trim()],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        is_active: row.get(2)?,
                        created_at: timestamp_column(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}
