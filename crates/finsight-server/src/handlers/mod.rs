//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod expenses;
pub mod incomes;
pub mod params;
pub mod reports;

// Re-export all handlers for use in router
pub use expenses::*;
pub use incomes::*;
pub use reports::*;

use axum::Json;

/// GET /api/health - Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
