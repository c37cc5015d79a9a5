use crate::error::Result;
use crate::models::records::{MeterTotal, MeterUpdate};
use crate::store::SharedStore;

const METER_TOTAL_KEY: &str = "meterTotal";
const METER_UPDATES_LIST: &str = "meterUpdates";

#[derive(Clone)]
pub struct MeterRepository {
    store: SharedStore,
}

impl MeterRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_total(&self) -> Result<Option<MeterTotal>> {
        match self.store.get(METER_TOTAL_KEY).await? {
            Some(raw) => Ok(Some(MeterTotal::decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_total(&self, total: &MeterTotal) -> Result<()> {
        self.store.set(METER_TOTAL_KEY, &total.encode()?).await
    }

    /// Append to the audit log, returning the log length.
    pub async fn append_update(&self, update: &MeterUpdate) -> Result<u64> {
        let encoded = serde_json::to_string(update)?;
        self.store.push(METER_UPDATES_LIST, &encoded).await
    }

    pub async fn last_update(&self) -> Result<Option<MeterUpdate>> {
        let raw = self.store.range_from_end(METER_UPDATES_LIST, 1).await?;
        match raw.last() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Store};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_total_round_trip_through_store() {
        let store = Arc::new(MemoryStore::new());
        let repo = MeterRepository::new(store.clone());

        assert_eq!(repo.get_total().await.unwrap(), None);

        let total = MeterTotal {
            value: 12_345.6789,
            timestamp: Some(Utc.with_ymd_and_hms(2017, 3, 30, 10, 0, 0).unwrap()),
        };
        repo.set_total(&total).await.unwrap();
        assert_eq!(repo.get_total().await.unwrap(), Some(total));
    }

    #[tokio::test]
    async fn test_reads_legacy_bare_total() {
        let store = Arc::new(MemoryStore::new());
        store.set("meterTotal", "10000").await.unwrap();
        let repo = MeterRepository::new(store);

        let total = repo.get_total().await.unwrap().unwrap();
        assert_eq!(total.value, 10_000.0);
        assert_eq!(total.timestamp, None);
    }

    #[tokio::test]
    async fn test_update_log_appends() {
        let store = Arc::new(MemoryStore::new());
        let repo = MeterRepository::new(store.clone());
        assert_eq!(repo.last_update().await.unwrap(), None);

        let update = |new_value: f64| MeterUpdate {
            timestamp: Utc.with_ymd_and_hms(2017, 3, 30, 10, 0, 0).unwrap(),
            old_value: Some(1.0),
            new_value,
            delta: Some(new_value - 1.0),
        };

        assert_eq!(repo.append_update(&update(2.0)).await.unwrap(), 1);
        assert_eq!(repo.append_update(&update(3.0)).await.unwrap(), 2);
        assert_eq!(store.len("meterUpdates"), 2);
        assert_eq!(repo.last_update().await.unwrap(), Some(update(3.0)));
    }
}
