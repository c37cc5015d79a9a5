use crate::error::Result;
use crate::models::records::DayRecord;
use crate::store::SharedStore;
use std::collections::BTreeMap;
use tracing::debug;

/// Day records of one month keyed by two digit day of month.
pub type MonthDays = BTreeMap<String, DayRecord>;

/// Persisted memo of date lookups: hash key is the four digit year, field
/// the two digit month, value a JSON object of day -> record.
#[derive(Clone)]
pub struct DayCacheRepository {
    store: SharedStore,
}

pub fn year_key(year: i32) -> String {
    format!("{:04}", year)
}

pub fn month_key(month: u32) -> String {
    format!("{:02}", month)
}

pub fn day_key(day: u32) -> String {
    format!("{:02}", day)
}

impl DayCacheRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_month(&self, year: i32, month: u32) -> Result<Option<MonthDays>> {
        let raw = self.store.hget(&year_key(year), &month_key(month)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Merge `record` into the stored month under `day`, re-reading the month
    /// first so entries cached since the caller's read are kept.
    pub async fn save_day(&self, year: i32, month: u32, day: u32, record: &DayRecord) -> Result<()> {
        let mut days = self.get_month(year, month).await?.unwrap_or_default();
        days.insert(day_key(day), record.clone());

        let encoded = serde_json::to_string(&days)?;
        self.store
            .hset(&year_key(year), &month_key(month), &encoded)
            .await?;
        debug!(year, month, day, cached_days = days.len(), "day cached");
        Ok(())
    }
}
