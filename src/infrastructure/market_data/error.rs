//! # Market Data Errors
//!
//! Error types for fetching from the external price source.
//!
//! # Examples
//!
//! ```
//! use trading_engine::infrastructure::market_data::error::MarketDataError;
//!
//! let error = MarketDataError::timeout("request timed out");
//! assert!(error.is_retryable());
//!
//! let error = MarketDataError::invalid_request("unknown symbol");
//! assert!(!error.is_retryable());
//! ```

use thiserror::Error;

/// Error type for price source operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketDataError {
    /// Request timed out.
    #[error("market data timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error, including 5xx responses.
    #[error("market data connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("market data rate limited: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// The source rejected the request (4xx other than 429).
    #[error("market data invalid request (status {status}): {message}")]
    InvalidRequest {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Body could not be read.
    #[error("market data protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// Client could not be constructed.
    #[error("market data internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl MarketDataError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates an invalid request error with a 400 status.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            status: 400,
            message: message.into(),
        }
    }

    /// Creates an invalid request error for a specific status.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            status,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the next tick may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::RateLimited { .. }
        )
    }
}

/// Result type for price source operations.
pub type MarketDataResult<T> = Result<T, MarketDataError>;
