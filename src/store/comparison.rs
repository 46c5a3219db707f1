use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Comparisons expire a week after they are saved
pub const DEFAULT_COMPARISON_TTL_DAYS: i64 = 7;

/// A saved destination comparison, shareable by id until it expires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: Uuid,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ComparisonRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[async_trait]
pub trait ComparisonStore: Send + Sync {
    /// Store a comparison and return it with its id and expiry
    async fn save(&self, data: Value) -> Result<ComparisonRecord>;

    /// Expired records are treated as absent
    async fn get(&self, id: Uuid) -> Result<Option<ComparisonRecord>>;

    /// Drop expired records, returning how many were removed
    async fn purge_expired(&self) -> Result<usize>;
}

/// Process-local comparison store for development and tests
#[derive(Debug, Clone)]
pub struct InMemoryComparisonStore {
    records: Arc<RwLock<HashMap<Uuid, ComparisonRecord>>>,
    ttl: Duration,
}

impl Default for InMemoryComparisonStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryComparisonStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::days(DEFAULT_COMPARISON_TTL_DAYS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl ComparisonStore for InMemoryComparisonStore {
    async fn save(&self, data: Value) -> Result<ComparisonRecord> {
        let created_at = Utc::now();
        let record = ComparisonRecord {
            id: Uuid::new_v4(),
            data,
            created_at,
            expires_at: created_at + self.ttl,
        };
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ComparisonRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(&id)
            .filter(|record| !record.is_expired_at(Utc::now()))
            .cloned())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        let removed = before - records.len();
        if removed > 0 {
            debug!(target: "itinerary::store", removed, "purged expired comparisons");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn saved_comparisons_are_retrievable() {
        let store = InMemoryComparisonStore::new();
        let record = store.save(json!({"totalUrls": 2})).await.unwrap();

        assert_eq!(record.expires_at - record.created_at, Duration::days(7));
        let loaded = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data["totalUrls"], 2);
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_comparisons_disappear() {
        let store = InMemoryComparisonStore::new().with_ttl(Duration::zero());
        let record = store.save(json!({})).await.unwrap();

        assert!(store.get(record.id).await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }
}
