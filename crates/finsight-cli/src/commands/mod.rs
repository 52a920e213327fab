//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init command and shared utilities (open_db, date parsing)
//! - `ledger` - Income and expense commands (add, list, archive, delete)
//! - `reports` - Analytics, monthly KPI and balance reports
//! - `serve` - Web server command

pub mod core;
pub mod ledger;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use ledger::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string for table display
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
