use super::{cached, AppState};
use crate::error::Result;
use crate::services::{KwhCount, KwhType};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;

fn max_age(kind: KwhType) -> u32 {
    match kind {
        KwhType::Seconds => 1,
        KwhType::Today => 60,
        KwhType::Hour => 5 * 60,
        KwhType::Day | KwhType::Week | KwhType::Month | KwhType::Year => 10 * 60,
    }
}

async fn respond(state: &AppState, kind: &str, count: KwhCount) -> Result<impl IntoResponse> {
    let parsed: KwhType = kind.parse()?;
    let body = state.kwh.handle_kwh(kind, count, Utc::now()).await?;
    Ok(cached(max_age(parsed), body))
}

/// GET /power/kwh/{type}
pub async fn get_kwh(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse> {
    respond(&state, &kind, KwhCount::default()).await
}

/// GET /power/kwh/{type}/{count}
pub async fn get_kwh_count(
    State(state): State<AppState>,
    Path((kind, count)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let count: KwhCount = count.parse()?;
    respond(&state, &kind, count).await
}
