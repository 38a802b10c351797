//! # Price Source Trait
//!
//! Port definition for the external market data source.
//!
//! The engine treats the source as opaque text: it fetches a URL and gets
//! the response body back. Parsing is left to whoever consumes the payload.

use crate::infrastructure::market_data::error::MarketDataResult;
use async_trait::async_trait;
use std::fmt;

/// A source of raw market data.
#[async_trait]
pub trait PriceSource: Send + Sync + fmt::Debug {
    /// Fetches the body served at `url`.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError` on network failure, timeout, or a
    /// non-success response.
    async fn fetch(&self, url: &str) -> MarketDataResult<String>;
}
