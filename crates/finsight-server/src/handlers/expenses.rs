//! Expense handlers

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
use finsight_core::models::{Expense, NewExpense};

/// Request body for creating or replacing an expense
#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    pub amount: Decimal,
    pub payment_method: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    /// YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS
    pub date: String,
}

impl ExpenseRequest {
    fn into_new(self) -> Result<NewExpense, AppError> {
        Ok(NewExpense {
            date: parse_timestamp(&self.date, "date", Bound::Start)?,
            amount: self.amount,
            payment_method: self.payment_method,
            category: self.category,
            description: self.description,
        })
    }
}

fn fetch(state: &AppState, user_id: i64, id: i64) -> Result<Expense, AppError> {
    state
        .db
        .get_expense(user_id, id)?
        .ok_or_else(|| AppError::not_found(&format!("Expense {} not found", id)))
}

/// GET /api/expense - List active expenses, newest first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let params = query_params(query)?;

    let expenses = state
        .db
        .list_expenses(user_id, &params.range()?, params.page())?;

    Ok(Json(expenses))
}

/// POST /api/expense - Record an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let req: ExpenseRequest = read_json(request).await?;

    let id = state.db.insert_expense(user_id, &req.into_new()?)?;
    info!(user_id, expense_id = id, "Created expense via API");

    Ok(Json(fetch(&state, user_id, id)?))
}

/// GET /api/expense/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    Ok(Json(fetch(&state, user_id, id)?))
}

/// PUT /api/expense/:id - Replace an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let req: ExpenseRequest = read_json(request).await?;

    state.db.update_expense(user_id, id, &req.into_new()?)?;

    Ok(Json(fetch(&state, user_id, id)?))
}

/// POST /api/expense/:id/archive - Hide an expense from reports
pub async fn archive_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    state.db.archive_expense(user_id, id)?;
    info!(user_id, expense_id = id, "Archived expense");
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /api/expense/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    state.db.delete_expense(user_id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
