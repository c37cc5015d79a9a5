pub mod dates;
pub mod kwh;
pub mod meter;
pub mod watts;

use crate::models::responses::StatusResponse;
use crate::repositories::{DayCacheRepository, MeterRepository, RollupRepository};
use crate::services::{DateLookupService, KwhService, MeterService, WattsService};
use crate::store::SharedStore;
use axum::{
    http::header,
    response::{IntoResponse, Json},
};
use chrono::FixedOffset;
use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub kwh: KwhService,
    pub watts: WattsService,
    pub dates: DateLookupService,
    pub meter: MeterService,
}

impl AppState {
    pub fn new(store: SharedStore, tz: FixedOffset, start_year: i32) -> Self {
        let rollups = RollupRepository::new(store.clone());
        Self {
            kwh: KwhService::new(rollups.clone(), tz),
            watts: WattsService::new(rollups.clone()),
            dates: DateLookupService::new(
                rollups,
                DayCacheRepository::new(store.clone()),
                tz,
                start_year,
            ),
            meter: MeterService::new(MeterRepository::new(store)),
        }
    }
}

/// JSON body with a public `Cache-Control` max-age in seconds.
pub(crate) fn cached<T: Serialize>(max_age: u32, body: T) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, format!("public, max-age={}", max_age))],
        Json(body),
    )
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "power meter api".into(),
        version: VERSION.into(),
    })
}
