use crate::error::{AppError, Result};
use crate::store::Store;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    scalars: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    full_scans: HashMap<String, usize>,
}

/// In-process store used by tests and by the database-less development mode.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AppError::Upstream("memory store lock poisoned".into()))
    }

    /// Number of times `range_all` has read `list`.
    pub fn full_scans(&self, list: &str) -> usize {
        self.lock()
            .map(|inner| inner.full_scans.get(list).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of elements currently stored in `list`.
    pub fn len(&self, list: &str) -> usize {
        self.lock()
            .map(|inner| inner.lists.get(list).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.scalars.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.scalars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn push(&self, list: &str, value: &str) -> Result<u64> {
        let mut inner = self.lock()?;
        let items = inner.lists.entry(list.to_string()).or_default();
        items.push(value.to_string());
        Ok(items.len() as u64)
    }

    async fn range_from_end(&self, list: &str, count: usize) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let items = match inner.lists.get(list) {
            Some(items) => items,
            None => return Ok(Vec::new()),
        };
        let start = items.len().saturating_sub(count);
        Ok(items[start..].to_vec())
    }

    async fn range_all(&self, list: &str) -> Result<Vec<String>> {
        let mut inner = self.lock()?;
        *inner.full_scans.entry(list.to_string()).or_default() += 1;
        Ok(inner.lists.get(list).cloned().unwrap_or_default())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .hashes
            .get(key)
            .and_then(|fields| fields.get(field))
            .cloned())
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.lock()?
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_from_end_short_list() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            for i in 0..6 {
                store.push("hours", &i.to_string()).await.unwrap();
            }

            let tail = store.range_from_end("hours", 1000).await.unwrap();
            assert_eq!(tail.len(), 6);
            assert_eq!(tail.first().map(String::as_str), Some("0"));

            let tail = store.range_from_end("hours", 2).await.unwrap();
            assert_eq!(tail, vec!["4", "5"]);

            assert!(store.range_from_end("missing", 5).await.unwrap().is_empty());
        });
    }

    #[test]
    fn test_push_returns_length_and_scans_are_counted() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            assert_eq!(store.push("days", "a").await.unwrap(), 1);
            assert_eq!(store.push("days", "b").await.unwrap(), 2);
            assert_eq!(store.len("days"), 2);

            assert_eq!(store.full_scans("days"), 0);
            store.range_all("days").await.unwrap();
            store.range_from_end("days", 1).await.unwrap();
            assert_eq!(store.full_scans("days"), 1);
        });
    }

    #[test]
    fn test_scalars_and_hashes() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            assert_eq!(store.get("meterTotal").await.unwrap(), None);
            store.set("meterTotal", "10").await.unwrap();
            assert_eq!(store.get("meterTotal").await.unwrap().as_deref(), Some("10"));

            store.hset("2017", "03", "{}").await.unwrap();
            assert_eq!(store.hget("2017", "03").await.unwrap().as_deref(), Some("{}"));
            assert_eq!(store.hget("2017", "04").await.unwrap(), None);
        });
    }
}
