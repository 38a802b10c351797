//! # In-Memory Trade Repository
//!
//! In-memory implementation of [`TradeRepository`] for tests and local runs.
//!
//! Records are kept as raw JSON strings keyed exactly as in Redis, so the
//! decode path is the same one the Redis repository takes, and malformed
//! payloads can be seeded with [`InMemoryTradeRepository::insert_raw`].

use crate::domain::entities::Trade;
use crate::infrastructure::persistence::traits::{
    RepositoryResult, TRADE_KEY_PREFIX, TradeRepository, decode_trade, encode_trade, trade_key,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`TradeRepository`].
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct InMemoryTradeRepository {
    storage: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryTradeRepository {
    /// Creates a new empty in-memory trade repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored keys, trade or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores a raw payload under an arbitrary key, bypassing encoding.
    pub async fn insert_raw(&self, key: impl Into<String>, payload: impl Into<String>) {
        let mut storage = self.storage.write().await;
        storage.insert(key.into(), payload.into());
    }
}

impl Default for InMemoryTradeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeRepository for InMemoryTradeRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<Trade>> {
        let storage = self.storage.read().await;
        storage
            .iter()
            .filter(|(key, _)| key.starts_with(TRADE_KEY_PREFIX))
            .map(|(key, payload)| decode_trade(key, payload))
            .collect()
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Trade>> {
        let key = trade_key(id);
        let storage = self.storage.read().await;
        storage
            .get(&key)
            .map(|payload| decode_trade(&key, payload))
            .transpose()
    }

    async fn save(&self, trade: &Trade) -> RepositoryResult<()> {
        let payload = encode_trade(trade)?;
        let mut storage = self.storage.write().await;
        storage.insert(trade_key(trade.id()), payload);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::timestamp::Timestamp;
    use crate::infrastructure::persistence::traits::RepositoryError;

    fn trade(id: &str, value: f64, status: &str) -> Trade {
        Trade::new(
            id,
            value,
            Timestamp::parse_rfc3339("2024-06-01T10:00:00Z").unwrap(),
            status,
        )
    }

    #[tokio::test]
    async fn new_repository_is_empty() {
        let repo = InMemoryTradeRepository::new();
        assert!(repo.is_empty());
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_and_get() {
        let repo = InMemoryTradeRepository::new();
        let t = trade("t-1", 12.5, "open");

        repo.save(&t).await.unwrap();

        assert_eq!(repo.get("t-1").await.unwrap(), Some(t));
        assert_eq!(repo.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_same_id() {
        let repo = InMemoryTradeRepository::new();
        repo.save(&trade("t-1", 1.0, "open")).await.unwrap();
        repo.save(&trade("t-1", 2.0, "closed")).await.unwrap();

        assert_eq!(repo.len(), 1);
        let stored = repo.get("t-1").await.unwrap().unwrap();
        assert_eq!(stored.status(), "closed");
        assert_eq!(stored.value(), 2.0);
    }

    #[tokio::test]
    async fn list_all_returns_every_record() {
        let repo = InMemoryTradeRepository::new();
        let trades = vec![
            trade("a", 1.0, "open"),
            trade("b", 2.25, "closed"),
            trade("c", -7.75, "whatever"),
        ];
        for t in &trades {
            repo.save(t).await.unwrap();
        }

        let mut listed = repo.list_all().await.unwrap();
        listed.sort_by(|x, y| x.id().cmp(y.id()));
        assert_eq!(listed, trades);
    }

    #[tokio::test]
    async fn list_all_ignores_keys_outside_namespace() {
        let repo = InMemoryTradeRepository::new();
        repo.save(&trade("a", 1.0, "open")).await.unwrap();
        repo.insert_raw("prices:SOLUSDC", "142.1").await;

        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_all_fails_on_single_malformed_record() {
        let repo = InMemoryTradeRepository::new();
        for i in 0..5 {
            repo.save(&trade(&format!("t-{i}"), i as f64, "open"))
                .await
                .unwrap();
        }
        repo.insert_raw("trades:broken", r#"{"id":"broken","value":"#)
            .await;

        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(_)));
    }
}
