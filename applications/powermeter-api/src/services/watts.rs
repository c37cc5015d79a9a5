use crate::energy::{kwh_to_watt, summarize_seconds};
use crate::error::{AppError, Result};
use crate::models::records::{BucketRecord, Resolution};
use crate::models::responses::{WattPoint, WattSeriesResponse, WattsResponse};
use crate::repositories::RollupRepository;

const MINUTES_PER_HOUR: usize = 60;
const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Clone)]
pub struct WattsService {
    rollups: RollupRepository,
}

impl WattsService {
    pub fn new(rollups: RollupRepository) -> Self {
        Self { rollups }
    }

    /// Average, max and min watts over the last `interval` seconds.
    pub async fn get_watts(&self, interval: u64) -> Result<WattsResponse> {
        if interval == 0 {
            return Err(AppError::InvalidArgument(
                "interval must be at least one second".into(),
            ));
        }

        let records = self
            .rollups
            .seconds_range_from_end(interval as usize)
            .await?;
        let first = records.first().ok_or_else(|| {
            AppError::EmptyAggregate(format!("no power readings in the last {} seconds", interval))
        })?;
        let summary = summarize_seconds(&records)?;

        Ok(WattsResponse {
            description: format!(
                "Current Usage in Watts, averaged over {} seconds",
                interval
            ),
            interval,
            watt: summary.watts.average,
            max: summary.watts.max,
            min: summary.watts.min,
            time: first.timestamp,
        })
    }

    /// One point per minute for the last hour.
    pub async fn get_watts_last_hour_series(&self) -> Result<WattSeriesResponse> {
        let records = self
            .rollups
            .range_from_end(Resolution::Minutes, MINUTES_PER_HOUR)
            .await?;
        let items = records
            .into_iter()
            .map(watt_point)
            .collect::<Result<Vec<_>>>()?;

        Ok(WattSeriesResponse {
            description: "Average watts per minute over an hour.".into(),
            container: "Array",
            items,
        })
    }
}

fn watt_point(record: BucketRecord) -> Result<WattPoint> {
    let watt = match record.watt {
        Some(w) => w.trunc() as i64,
        None => kwh_to_watt(record.kwh, SECONDS_PER_MINUTE)?,
    };

    Ok(WattPoint {
        time: record.timestamp,
        watt,
        per_second: record
            .breakdown
            .map(|b| b.into_values())
            .unwrap_or_default(),
    })
}
