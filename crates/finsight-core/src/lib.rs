//! Finsight Core Library
//!
//! Shared functionality for the Finsight personal finance tool:
//! - Database access and migrations for incomes and expenses
//! - Aggregate ledger queries behind the `LedgerStore` trait
//! - Analytics engine producing dashboard, monthly and balance reports

pub mod analytics;
pub mod db;
pub mod error;
pub mod models;
pub mod money;

pub use analytics::AnalyticsEngine;
pub use db::{Database, LedgerStore, Page};
pub use error::{Error, Result};
