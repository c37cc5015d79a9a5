use super::{cached, AppState};
use crate::error::{AppError, Result};
use crate::models::responses::MeterUpdateResponse;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::Value;

/// GET /power/meter/total
pub async fn get_total(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state.meter.get_total().await?;
    Ok(cached(6, body))
}

/// PUT /power/meter/total with body `{"value": <number>}`. Numeric strings
/// are accepted as well.
pub async fn put_total(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<MeterUpdateResponse>> {
    let Json(body) = body.map_err(|e| AppError::InvalidArgument(e.body_text()))?;
    let value = match body.get("value") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        AppError::InvalidArgument("body must contain a numeric \"value\"".into())
    })?;

    let response = state.meter.put_total(value, Utc::now()).await?;
    Ok(Json(response))
}
