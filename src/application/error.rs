//! # Application Errors
//!
//! Error types raised by the pluggable policies the engine loops run.
//!
//! # Error Hierarchy
//!
//! ```text
//! ResolveError
//! ├── Policy(String)           - The resolution policy rejected or failed a trade
//! └── Store(RepositoryError)   - Writing the resolved trade back failed
//!
//! FlushError
//! ├── Policy(String)           - The flush policy failed
//! └── Store(RepositoryError)   - The trade store failed during a flush
//! ```
//!
//! # Examples
//!
//! ```
//! use trading_engine::application::error::ResolveError;
//! use trading_engine::infrastructure::persistence::RepositoryError;
//!
//! let err = ResolveError::policy("price feed stale");
//! assert!(matches!(err, ResolveError::Policy(_)));
//!
//! let err: ResolveError = RepositoryError::connection("reset").into();
//! assert!(matches!(err, ResolveError::Store(_)));
//! ```

use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Error resolving a single trade.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The policy could not decide on the trade.
    #[error("resolution policy error: {0}")]
    Policy(String),

    /// The trade store failed while saving the outcome.
    #[error("trade store error: {0}")]
    Store(#[from] RepositoryError),
}

impl ResolveError {
    /// Creates a policy error.
    #[must_use]
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy(message.into())
    }
}

/// Error flushing trades in the persistence loop.
#[derive(Debug, Error)]
pub enum FlushError {
    /// The policy failed.
    #[error("flush policy error: {0}")]
    Policy(String),

    /// The trade store failed during the flush.
    #[error("trade store error: {0}")]
    Store(#[from] RepositoryError),
}

impl FlushError {
    /// Creates a policy error.
    #[must_use]
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy(message.into())
    }
}
