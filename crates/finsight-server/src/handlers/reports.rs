//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, Request, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::params::{
    parse_range, query_params, validate_day, validate_month, validate_year,
};
use crate::{current_user, AppError, AppState};
use finsight_core::models::{
    AnalyticsReport, BalanceFilter, BalanceReport, MonthlyKpiReport, ReportFilter,
};
use finsight_core::AnalyticsEngine;

/// Query parameters for the full analytics report
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Calendar year; also selects the year of the monthly series
    pub year: Option<i32>,
    /// Inclusive range start (wins over `year` for totals)
    pub start_date: Option<String>,
    /// Inclusive range end
    pub end_date: Option<String>,
}

/// GET /api/analytics - KPIs, breakdowns, monthly series, Pareto, histogram, pivot
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<AnalyticsReport>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let params = query_params(query)?;

    let filter = ReportFilter {
        year: validate_year(params.year)?,
        range: parse_range(params.start_date.as_deref(), params.end_date.as_deref())?,
    };

    let report = AnalyticsEngine::new(&state.db).report(user_id, &filter)?;

    info!(
        user_id,
        year = ?filter.year,
        ranged = !filter.range.is_empty(),
        "Served analytics report"
    );

    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyKpiQuery {
    pub year: Option<i32>,
    /// 1-12
    pub month: Option<u32>,
}

/// GET /api/kpi/monthly - KPIs for one month (defaults to the current month)
pub async fn get_monthly_kpis(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MonthlyKpiQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<MonthlyKpiReport>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let params = query_params(query)?;

    let year = validate_year(params.year)?;
    let month = validate_month(params.month)?;

    let report = AnalyticsEngine::new(&state.db).monthly_kpis(user_id, year, month)?;

    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/balance - Income, expense and balance for a period
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
    request: Request,
) -> Result<Json<BalanceReport>, AppError> {
    let user_id = current_user(&state, request.headers())?;
    let params = query_params(query)?;

    let filter = BalanceFilter {
        day: validate_day(params.day)?,
        month: validate_month(params.month)?,
        year: validate_year(params.year)?,
        range: parse_range(params.start_date.as_deref(), params.end_date.as_deref())?,
    };

    let report = AnalyticsEngine::new(&state.db).balance(user_id, &filter)?;

    Ok(Json(report))
}
