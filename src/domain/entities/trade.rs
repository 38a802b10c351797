//! # Trade Entity
//!
//! The persisted record for one market position and its status.
//!
//! A [`Trade`] is created outside the engine; the engine reads it through the
//! trade store and may write it back after resolution. The `status` field is
//! an open-ended tag: [`Trade::STATUS_OPEN`] and [`Trade::STATUS_CLOSED`] are
//! the values the engine itself understands, but any string round-trips.
//!
//! # Wire Format
//!
//! ```text
//! {"id": "t-1", "value": 101.25, "timestamp": "2024-01-01T00:00:00Z", "status": "open"}
//! ```
//!
//! # Examples
//!
//! ```
//! use trading_engine::domain::entities::Trade;
//! use trading_engine::domain::value_objects::timestamp::Timestamp;
//!
//! let trade = Trade::new("t-1", 101.25, Timestamp::now(), Trade::STATUS_OPEN);
//! assert!(trade.is_open());
//!
//! let closed = trade.with_status(Trade::STATUS_CLOSED);
//! assert!(!closed.is_open());
//! ```

use crate::domain::value_objects::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trade record as stored under `trades:<id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    id: String,
    value: f64,
    timestamp: Timestamp,
    status: String,
}

impl Trade {
    /// Status of a trade awaiting resolution.
    pub const STATUS_OPEN: &'static str = "open";

    /// Status of a resolved trade.
    pub const STATUS_CLOSED: &'static str = "closed";

    /// Creates a new trade record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        value: f64,
        timestamp: Timestamp,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            value,
            timestamp,
            status: status.into(),
        }
    }

    /// Returns the trade identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the trade value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the point in time the record refers to.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the raw status tag.
    #[inline]
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns true if the trade is awaiting resolution.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == Self::STATUS_OPEN
    }

    /// Returns a copy of this trade with a different status.
    #[must_use]
    pub fn with_status(&self, status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade({} value={} status={} at {})",
            self.id, self.value, self.status, self.timestamp
        )
    }
}
