//! Query and body parameter parsing shared by the handlers

use axum::extract::{rejection::QueryRejection, Query};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::{AppError, MAX_PAGE_LIMIT};
use finsight_core::models::DateRange;
use finsight_core::Page;

/// Earliest accepted calendar year
pub const MIN_YEAR: i32 = 1900;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Unwrap a query string extractor, reporting malformed values as 400 `{"error"}`
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        AppError::bad_request(&format!(
            "Invalid query parameters: {}",
            rejection.body_text()
        ))
    })
}

/// Which end of a range a date-only value stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
///
/// A date-only value becomes the first second of the day for a start bound
/// and the last second of the day for an end bound.
pub fn parse_timestamp(value: &str, field: &str, bound: Bound) -> Result<NaiveDateTime, AppError> {
    let value = value.trim();
    let invalid = || {
        AppError::bad_request(&format!(
            "Invalid {} (use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)",
            field
        ))
    };

    if let Some(ts) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Ok(ts);
    }

    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    let ts = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_opt(23, 59, 59),
    };
    ts.ok_or_else(invalid)
}

/// Parse optional `start_date`/`end_date` into an inclusive range
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, AppError> {
    let start = start
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_timestamp(s, "start_date", Bound::Start))
        .transpose()?;
    let end = end
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_timestamp(s, "end_date", Bound::End))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(AppError::bad_request(
                "start_date must not be after end_date",
            ));
        }
    }

    Ok(DateRange::new(start, end))
}

pub fn validate_year(year: Option<i32>) -> Result<Option<i32>, AppError> {
    match year {
        Some(y) if !(MIN_YEAR..=9999).contains(&y) => Err(AppError::bad_request(&format!(
            "year must be between {} and 9999",
            MIN_YEAR
        ))),
        _ => Ok(year),
    }
}

pub fn validate_month(month: Option<u32>) -> Result<Option<u32>, AppError> {
    match month {
        Some(m) if !(1..=12).contains(&m) => {
            Err(AppError::bad_request("month must be between 1 and 12"))
        }
        _ => Ok(month),
    }
}

pub fn validate_day(day: Option<u32>) -> Result<Option<u32>, AppError> {
    match day {
        Some(d) if !(1..=31).contains(&d) => {
            Err(AppError::bad_request("day must be between 1 and 31"))
        }
        _ => Ok(day),
    }
}

/// Query parameters for record listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

impl ListQuery {
    pub fn range(&self) -> Result<DateRange, AppError> {
        parse_range(self.start_date.as_deref(), self.end_date.as_deref())
    }

    pub fn page(&self) -> Page {
        Page {
            limit: self.limit.max(1).min(MAX_PAGE_LIMIT),
            offset: self.offset.max(0),
        }
    }
}

/// Read a JSON request body, mapping failures to 400
pub async fn read_json<T: serde::de::DeserializeOwned>(
    request: axum::extract::Request,
) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 64)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}
