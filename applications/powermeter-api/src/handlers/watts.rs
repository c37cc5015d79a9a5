use super::{cached, AppState};
use crate::error::{AppError, Result};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

const DEFAULT_INTERVAL: u64 = 10;

/// GET /power/watts
pub async fn get_watts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state.watts.get_watts(DEFAULT_INTERVAL).await?;
    Ok(cached(5, body))
}

/// GET /power/watts/{interval}
pub async fn get_watts_interval(
    State(state): State<AppState>,
    Path(interval): Path<String>,
) -> Result<impl IntoResponse> {
    // Bounded by i64 since the record count becomes a SQL LIMIT
    let interval = interval
        .parse::<i64>()
        .ok()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "interval must be a number of seconds up to {} or the keyword \"hour\"; got {:?}",
                i64::MAX,
                interval
            ))
        })?;
    let body = state.watts.get_watts(interval).await?;
    Ok(cached(5, body))
}

/// GET /power/watts/hour
pub async fn get_last_hour(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state.watts.get_watts_last_hour_series().await?;
    Ok(cached(30, body))
}
