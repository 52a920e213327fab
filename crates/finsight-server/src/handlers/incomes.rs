//! Income handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, Request, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::params::{parse_timestamp, query_params, read_json, Bound, ListQuery};
use crate::{current_user, AppError, AppState, SuccessResponse};
use finsight_core::models::{Income, NewIncome};

/// Request body for creating or replacing an income
#[derive(Debug, Deserialize)]
pub struct IncomeRequest {
    pub source: String,
    pub amount: Decimal,
    pub category: String,
    #[serde(default)]
    pub observations: Option<String>,
    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS
    pub date: String,
}

impl IncomeRequest {
    fn into_new(self) -> Result<NewIncome, AppError> {
        Ok(NewIncome {
            date: parse_timestamp(&self.date, "date", Bound::Start)?,
            source: self.source,
            amount: self.amount,
            category: self.category,
            observations: self.observations,
        })
    }
}

fn fetch(state: &AppState, user_id: i64, id: i64) -> Result<Income, AppError> {
    state
        .db
        .get_income(user_id, id)?
        .ok_or_else(|| AppError::not_found(&format!("Income {} not found", id)))
}

/// GET /api/income - List active incomes, newest first
pub async fn list_incomes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<Vec<Income>>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let params = query_params(query)?;

    let incomes = state
        .db
        .list_incomes(user_id, &params.range()?, params.page())?;

    Ok(Json(incomes))
}

/// POST /api/income - Record an income
pub async fn create_income(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Income>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let req: IncomeRequest = read_json(request).await?;

    let id = state.db.insert_income(user_id, &req.into_new()?)?;
    info!(user_id, income_id = id, "Created income via API");

    Ok(Json(fetch(&state, user_id, id)?))
}

/// GET /api/income/:id - Get a single income
pub async fn get_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Income>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    Ok(Json(fetch(&state, user_id, id)?))
}

/// PUT /api/income/:id - Replace an income
pub async fn update_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Income>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let req: IncomeRequest = read_json(request).await?;

    state.db.update_income(user_id, id, &req.into_new()?)?;

    Ok(Json(fetch(&state, user_id, id)?))
}

/// POST /api/income/:id/archive - Hide an income from reports
pub async fn archive_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    state.db.archive_income(user_id, id)?;
    info!(user_id, income_id = id, "Archived income");
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/income/:id - Delete an income
pub async fn delete_income(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    state.db.delete_income(user_id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
