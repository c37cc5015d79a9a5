use crate::energy::{KwhStats, SecondsSummary};
use crate::models::records::{BucketRecord, MeterUpdate};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary over the last N buckets of one resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KwhSummaryResponse {
    pub description: String,
    /// Number of buckets returned.
    pub count: usize,
    /// Number of buckets asked for; larger than `count` on a short read.
    pub requested: usize,
    #[serde(flatten)]
    pub stats: KwhStats,
    pub list: Vec<BucketRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondsResponse {
    pub description: String,
    /// Seconds covered by the returned records.
    pub count: usize,
    /// Seconds asked for; larger than `count` on a short read.
    pub requested: usize,
    pub time: DateTime<Utc>,
    pub timestamp: i64,
    pub summary: SecondsSummary,
    pub list: Vec<BucketRecord>,
}

/// A single kWh figure, used for today and the month so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageResponse {
    pub description: String,
    pub date: DateTime<Utc>,
    pub kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KwhResponse {
    Seconds(SecondsResponse),
    Usage(UsageResponse),
    Summary(KwhSummaryResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthResponse {
    pub description: String,
    #[serde(flatten)]
    pub record: BucketRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WattsResponse {
    pub description: String,
    pub interval: u64,
    pub watt: i64,
    pub max: i64,
    pub min: i64,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WattPoint {
    pub time: DateTime<Utc>,
    pub watt: i64,
    pub per_second: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WattSeriesResponse {
    pub description: String,
    pub container: &'static str,
    pub items: Vec<WattPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterTotalResponse {
    pub description: String,
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterUpdateResponse {
    pub description: String,
    #[serde(flatten)]
    pub update: MeterUpdate,
    /// Length of the update log after this write.
    pub meter_updates: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub version: String,
}
