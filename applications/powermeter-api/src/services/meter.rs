use crate::energy::round4;
use crate::error::{AppError, Result};
use crate::models::records::{MeterTotal, MeterUpdate};
use crate::models::responses::{MeterTotalResponse, MeterUpdateResponse};
use crate::repositories::MeterRepository;
use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Clone)]
pub struct MeterService {
    meter: MeterRepository,
}

impl MeterService {
    pub fn new(meter: MeterRepository) -> Self {
        Self { meter }
    }

    pub async fn get_total(&self) -> Result<MeterTotalResponse> {
        let total = self
            .meter
            .get_total()
            .await?
            .ok_or_else(|| AppError::NotFound("no meter total has been registered".into()))?;
        let delta = self.meter.last_update().await?.and_then(|u| u.delta);

        Ok(MeterTotalResponse {
            description: "Current Power meter total registered on server".into(),
            value: round4(total.value),
            timestamp: total.timestamp,
            delta,
        })
    }

    /// Store a new meter reading and append the change to the update log.
    ///
    /// The read of the old value and the write of the new one are separate
    /// store calls. Two concurrent updates can read the same old value, in
    /// which case one of the logged deltas is wrong.
    pub async fn put_total(&self, value: f64, now: DateTime<Utc>) -> Result<MeterUpdateResponse> {
        if !value.is_finite() {
            return Err(AppError::InvalidArgument(format!(
                "meter total must be a finite number; got {}",
                value
            )));
        }

        let old_value = self.meter.get_total().await?.map(|t| t.value);
        let update = MeterUpdate {
            timestamp: now,
            old_value,
            new_value: value,
            delta: old_value.map(|old| round4(value - old)),
        };

        self.meter
            .set_total(&MeterTotal {
                value,
                timestamp: Some(now),
            })
            .await?;
        let meter_updates = self.meter.append_update(&update).await?;

        info!(
            old_value = ?update.old_value,
            new_value = value,
            delta = ?update.delta,
            meter_updates,
            "meter total updated"
        );

        Ok(MeterUpdateResponse {
            description: "Updated meterTotal and updated statistics.".into(),
            update,
            meter_updates,
        })
    }
}
