use super::{cached, AppState, VERSION};
use crate::error::{AppError, Result};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use std::str::FromStr;

fn parse_part<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        AppError::InvalidArgument(format!("{} must be a number; got {:?}", name, raw))
    })
}

/// GET /power/kwh/date
pub async fn usage() -> impl IntoResponse {
    cached(
        864_000,
        json!({
            "version": VERSION,
            "description": "Get power usage information for a given date, month or year.",
            "usage": "/power/kwh/date/{year}/{month}/{day}",
        }),
    )
}

/// GET /power/kwh/date/{year}
pub async fn get_year(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> Result<()> {
    let year = parse_part("year", &year)?;
    state.dates.validate_year(year, Utc::now())?;
    Err(AppError::NotImplemented(format!(
        "usage for the entire year {} is not available yet",
        year
    )))
}

/// GET /power/kwh/date/{year}/{month}
pub async fn get_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let year = parse_part("year", &year)?;
    let month = parse_part("month", &month)?;
    let body = state
        .dates
        .get_month_summary(year, month, Utc::now())
        .await?;
    Ok(cached(86_400, body))
}

/// GET /power/kwh/date/{year}/{month}/{day}
pub async fn get_day(
    State(state): State<AppState>,
    Path((year, month, day)): Path<(String, String, String)>,
) -> Result<impl IntoResponse> {
    let year = parse_part("year", &year)?;
    let month = parse_part("month", &month)?;
    let day = parse_part("day", &day)?;
    let body = state
        .dates
        .find_by_date(year, month, day, Utc::now())
        .await?;
    Ok(cached(864_000, body))
}
