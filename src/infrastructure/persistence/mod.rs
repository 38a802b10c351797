//! # Persistence Layer
//!
//! Trade store port and its implementations.
//!
//! ## Repository Trait (Port)
//!
//! - [`TradeRepository`]: Persistence for trade records
//!
//! ## Implementations
//!
//! - `redis`: Redis-backed store used in production
//! - `in_memory`: In-memory store for tests and local runs
//! - `retry`: Decorator adding bounded retry with backoff

pub mod in_memory;
pub mod redis;
pub mod retry;
pub mod traits;

pub use retry::{RetryPolicy, RetryingTradeRepository};
pub use traits::{
    RepositoryError, RepositoryResult, TRADE_KEY_PATTERN, TRADE_KEY_PREFIX, TradeRepository,
    decode_trade, encode_trade, trade_key,
};
