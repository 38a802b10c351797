//! # Redis Trade Repository
//!
//! Redis implementation of [`TradeRepository`].
//!
//! Trades are stored as JSON strings under `trades:<id>`. The connection is
//! opened lazily on first use through a shared [`ConnectionManager`], so a
//! repository can be built at startup from an address that is empty or
//! unreachable. An address that does not parse surfaces as a
//! non-retryable `RepositoryError::Internal` from the first call that needs
//! the store; I/O failures surface as `RepositoryError::Connection`.
//!
//! # Examples
//!
//! ```ignore
//! use trading_engine::infrastructure::persistence::redis::RedisTradeRepository;
//!
//! let repo = RedisTradeRepository::new("redis://redis:6379");
//! let trades = repo.list_all().await?;
//! ```

use crate::domain::entities::Trade;
use crate::infrastructure::persistence::traits::{
    RepositoryError, RepositoryResult, TRADE_KEY_PATTERN, TradeRepository, decode_trade,
    encode_trade, trade_key,
};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Redis implementation of [`TradeRepository`].
///
/// Cloning shares the lazily-established connection.
#[derive(Clone)]
pub struct RedisTradeRepository {
    address: String,
    manager: Arc<OnceCell<ConnectionManager>>,
}

impl RedisTradeRepository {
    /// Creates a repository for the given Redis address.
    ///
    /// No connection is attempted until the first operation.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            manager: Arc::new(OnceCell::new()),
        }
    }

    /// Returns the configured Redis address.
    #[inline]
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns true once a connection has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.manager.initialized()
    }

    async fn connection(&self) -> RepositoryResult<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let client = redis::Client::open(self.address.as_str()).map_err(|e| {
                    RepositoryError::internal(format!(
                        "invalid redis address {:?}: {}",
                        self.address, e
                    ))
                })?;
                let manager = ConnectionManager::new(client).await.map_err(map_redis_error)?;
                debug!(address = %self.address, "redis connection established");
                Ok::<_, RepositoryError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

impl fmt::Debug for RedisTradeRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisTradeRepository")
            .field("address", &self.address)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[async_trait]
impl TradeRepository for RedisTradeRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<Trade>> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = conn.keys(TRADE_KEY_PATTERN).await.map_err(map_redis_error)?;

        let mut trades = Vec::with_capacity(keys.len());
        for key in keys {
            let payload: Option<String> = conn.get(&key).await.map_err(map_redis_error)?;
            let payload = payload.ok_or_else(|| {
                RepositoryError::query(format!("{key} disappeared during enumeration"))
            })?;
            trades.push(decode_trade(&key, &payload)?);
        }
        Ok(trades)
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Trade>> {
        let key = trade_key(id);
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(&key).await.map_err(map_redis_error)?;
        payload.map(|p| decode_trade(&key, &p)).transpose()
    }

    async fn save(&self, trade: &Trade) -> RepositoryResult<()> {
        let payload = encode_trade(trade)?;
        let mut conn = self.connection().await?;
        let () = conn
            .set(trade_key(trade.id()), payload)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

/// Maps a Redis error onto the repository taxonomy.
fn map_redis_error(error: redis::RedisError) -> RepositoryError {
    if error.is_io_error()
        || error.is_connection_dropped()
        || error.is_connection_refusal()
        || error.is_timeout()
    {
        RepositoryError::connection(error.to_string())
    } else {
        RepositoryError::query(error.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::retry::{RetryPolicy, RetryingTradeRepository};
    use std::time::Duration;

    #[test]
    fn construction_does_not_connect() {
        let repo = RedisTradeRepository::new("redis://redis:6379");
        assert_eq!(repo.address(), "redis://redis:6379");
        assert!(!repo.is_connected());
    }

    #[test]
    fn debug_hides_connection_internals() {
        let repo = RedisTradeRepository::new("redis://localhost:6379");
        let dbg = format!("{repo:?}");
        assert!(dbg.contains("localhost:6379"));
        assert!(dbg.contains("connected: false"));
    }

    #[tokio::test]
    async fn empty_address_surfaces_on_first_use() {
        let repo = RedisTradeRepository::new("");
        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Internal(_)));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("invalid redis address"));
        assert!(!repo.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn unparsable_address_is_not_retried() {
        let repo = RetryingTradeRepository::new(RedisTradeRepository::new(""), RetryPolicy::store());
        let started = tokio::time::Instant::now();

        assert!(repo.list_all().await.is_err());
        // Any retry would have slept at least the base backoff.
        assert!(started.elapsed() < Duration::from_millis(RetryPolicy::store().base_delay_ms / 2));
    }
}
