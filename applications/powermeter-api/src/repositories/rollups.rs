use crate::energy::units::SECONDS_PER_RECORD;
use crate::error::{AppError, Result};
use crate::models::records::{BucketRecord, Resolution};
use crate::store::SharedStore;
use tracing::debug;

/// Read access to the six rollup lists. The lists are written by the
/// ingestion process only.
#[derive(Clone)]
pub struct RollupRepository {
    store: SharedStore,
}

impl RollupRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The last `count` records of `resolution`, oldest first. Returns fewer
    /// records when the list is shorter; callers report the difference.
    pub async fn range_from_end(
        &self,
        resolution: Resolution,
        count: usize,
    ) -> Result<Vec<BucketRecord>> {
        if count == 0 {
            return Err(AppError::InvalidArgument(format!(
                "count of {} must be at least 1",
                resolution
            )));
        }

        let raw = self
            .store
            .range_from_end(resolution.list_name(), count)
            .await?;
        debug!(list = %resolution, requested = count, found = raw.len(), "range from end");

        decode_all(&raw, resolution)
    }

    /// Records covering the last `seconds` seconds. The `seconds` list holds
    /// one record per ten seconds.
    pub async fn seconds_range_from_end(&self, seconds: usize) -> Result<Vec<BucketRecord>> {
        self.range_from_end(Resolution::Seconds, seconds.div_ceil(SECONDS_PER_RECORD))
            .await
    }

    /// Every record of `resolution`, oldest first.
    pub async fn all(&self, resolution: Resolution) -> Result<Vec<BucketRecord>> {
        let raw = self.store.range_all(resolution.list_name()).await?;
        debug!(list = %resolution, found = raw.len(), "full list read");
        decode_all(&raw, resolution)
    }
}

fn decode_all(raw: &[String], resolution: Resolution) -> Result<Vec<BucketRecord>> {
    raw.iter()
        .map(|item| BucketRecord::decode(item, resolution))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::Breakdown;
    use crate::store::{MemoryStore, Store};
    use std::sync::Arc;

    async fn store_with(list: &str, items: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for item in items {
            store.push(list, item).await.unwrap();
        }
        store
    }

    fn hour(i: usize) -> String {
        format!(
            r#"{{"timestamp":{},"kwh":{}.5,"total":{},"perMinute":[100,200]}}"#,
            1_490_911_200_000u64 + i as u64 * 3_600_000,
            i,
            i * 10_000 + 5_000
        )
    }

    #[tokio::test]
    async fn test_range_from_end_short_read_returns_all() {
        let hours: Vec<String> = (0..6).map(hour).collect();
        let refs: Vec<&str> = hours.iter().map(String::as_str).collect();
        let repo = RollupRepository::new(store_with("hours", &refs).await);

        let records = repo.range_from_end(Resolution::Hours, 1000).await.unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].kwh, 0.5);
        assert_eq!(records[5].kwh, 5.5);
        assert!(records.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_range_from_end_takes_tail() {
        let hours: Vec<String> = (0..6).map(hour).collect();
        let refs: Vec<&str> = hours.iter().map(String::as_str).collect();
        let repo = RollupRepository::new(store_with("hours", &refs).await);

        let records = repo.range_from_end(Resolution::Hours, 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kwh, 4.5);
        assert_eq!(
            records[1].breakdown,
            Some(Breakdown::PerMinute(vec![100.0, 200.0]))
        );
    }

    #[tokio::test]
    async fn test_range_from_end_rejects_zero() {
        let repo = RollupRepository::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            repo.range_from_end(Resolution::Days, 0).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_seconds_range_reads_ten_second_records() {
        let items: Vec<String> = (0..20)
            .map(|i| format!(r#"{{"timestamp":{},"kwh":0.01,"watt":3600}}"#, i * 10_000))
            .collect();
        let refs: Vec<&str> = items.iter().map(String::as_str).collect();
        let repo = RollupRepository::new(store_with("seconds", &refs).await);

        assert_eq!(repo.seconds_range_from_end(60).await.unwrap().len(), 6);
        assert_eq!(repo.seconds_range_from_end(61).await.unwrap().len(), 7);
        assert_eq!(repo.seconds_range_from_end(1).await.unwrap().len(), 1);
        assert!(repo.seconds_range_from_end(0).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_record_is_an_upstream_error() {
        let repo = RollupRepository::new(store_with("days", &["{broken"]).await);
        let err = repo.range_from_end(Resolution::Days, 1).await.unwrap_err();
        assert_eq!(err.kind(), "UpstreamFailure");
    }
}
