//! # Repository Traits
//!
//! Port definition for the trade store.
//!
//! [`TradeRepository`] abstracts the key-value store holding trade records.
//! Every implementation stores a trade as its JSON encoding under the key
//! returned by [`trade_key`], and shares the decoding rules in
//! [`decode_trade`] so that a malformed record fails the same way regardless
//! of backend.
//!
//! # Examples
//!
//! ```ignore
//! use trading_engine::infrastructure::persistence::TradeRepository;
//!
//! async fn open_trades(repo: &dyn TradeRepository) {
//!     let trades = repo.list_all().await?;
//!     println!("{} open", trades.iter().filter(|t| t.is_open()).count());
//! }
//! ```

use crate::domain::entities::Trade;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Key prefix shared by every trade record.
pub const TRADE_KEY_PREFIX: &str = "trades:";

/// Glob pattern enumerating every trade key.
pub const TRADE_KEY_PATTERN: &str = "trades:*";

/// Returns the store key for a trade id.
///
/// # Examples
///
/// ```
/// use trading_engine::infrastructure::persistence::trade_key;
///
/// assert_eq!(trade_key("abc"), "trades:abc");
/// ```
#[must_use]
pub fn trade_key(id: &str) -> String {
    format!("{TRADE_KEY_PREFIX}{id}")
}

/// Decodes a stored trade value.
///
/// # Errors
///
/// Returns `RepositoryError::Serialization` naming the offending key if the
/// payload is not a valid trade.
pub fn decode_trade(key: &str, payload: &str) -> RepositoryResult<Trade> {
    serde_json::from_str(payload)
        .map_err(|e| RepositoryError::serialization(format!("{key}: {e}")))
}

/// Encodes a trade for storage.
///
/// # Errors
///
/// Returns `RepositoryError::Serialization` if the trade cannot be encoded
/// (a non-finite `value`).
pub fn encode_trade(trade: &Trade) -> RepositoryResult<String> {
    if !trade.value().is_finite() {
        return Err(RepositoryError::serialization(format!(
            "{}: value {} is not representable in JSON",
            trade_key(trade.id()),
            trade.value()
        )));
    }
    serde_json::to_string(trade).map_err(|e| RepositoryError::serialization(e.to_string()))
}

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the operation may succeed when retried.
    ///
    /// Only connection failures are retryable; a record that fails to decode
    /// will fail again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository for trade records.
///
/// Implementations are shared across the engine loops and must be safe to
/// call concurrently.
#[async_trait]
pub trait TradeRepository: Send + Sync + fmt::Debug {
    /// Returns every trade under the `trades:` namespace.
    ///
    /// Fails as a whole if enumeration fails, any single fetch fails, or any
    /// single record does not decode. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns the first `RepositoryError` encountered.
    async fn list_all(&self) -> RepositoryResult<Vec<Trade>>;

    /// Gets a trade by id.
    ///
    /// Returns `None` if the trade does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on store or decode failure.
    async fn get(&self, id: &str) -> RepositoryResult<Option<Trade>>;

    /// Saves a trade, replacing any record with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on store or encode failure.
    async fn save(&self, trade: &Trade) -> RepositoryResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::timestamp::Timestamp;

    #[test]
    fn key_uses_namespace_prefix() {
        assert_eq!(trade_key("42"), "trades:42");
        assert!(trade_key("42").starts_with(TRADE_KEY_PREFIX));
    }

    #[test]
    fn decode_error_names_key() {
        let err = decode_trade("trades:bad", "{not json").unwrap_err();
        assert!(matches!(err, RepositoryError::Serialization(_)));
        assert!(err.to_string().contains("trades:bad"));
    }

    #[test]
    fn encode_rejects_non_finite_value() {
        let trade = Trade::new("nan", f64::NAN, Timestamp::now(), Trade::STATUS_OPEN);
        assert!(encode_trade(&trade).is_err());
    }

    #[test]
    fn encode_then_decode_preserves_fields() {
        let trade = Trade::new(
            "t-9",
            0.5,
            Timestamp::parse_rfc3339("2024-02-29T23:59:59.999Z").unwrap(),
            "pending-review",
        );
        let encoded = encode_trade(&trade).unwrap();
        let decoded = decode_trade(&trade_key(trade.id()), &encoded).unwrap();
        assert_eq!(decoded, trade);
    }

    #[test]
    fn only_connection_errors_are_retryable() {
        assert!(RepositoryError::connection("reset").is_retryable());
        assert!(!RepositoryError::query("WRONGTYPE").is_retryable());
        assert!(!RepositoryError::serialization("eof").is_retryable());
        assert!(!RepositoryError::internal("bug").is_retryable());
    }
}
