//! # HTTP Price Source
//!
//! [`PriceSource`] backed by a shared `reqwest` client.
//!
//! Every request is bounded by the configured timeout, so a fetch that is in
//! flight when the engine shuts down finishes or fails on its own within that
//! bound.
//!
//! # Examples
//!
//! ```ignore
//! use std::time::Duration;
//! use trading_engine::infrastructure::market_data::HttpPriceSource;
//!
//! let source = HttpPriceSource::new(Duration::from_secs(10))?;
//! let body = source.fetch("https://api.binance.com/api/v3/ticker/price?symbol=SOLUSDC").await?;
//! ```

use crate::infrastructure::market_data::error::{MarketDataError, MarketDataResult};
use crate::infrastructure::market_data::traits::PriceSource;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// HTTP implementation of [`PriceSource`].
#[derive(Debug, Clone)]
pub struct HttpPriceSource {
    client: Client,
    timeout: Duration,
}

impl HttpPriceSource {
    /// Creates a source whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::Internal` if the client cannot be created.
    pub fn new(timeout: Duration) -> MarketDataResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketDataError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Returns the configured request timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Maps a reqwest error to a MarketDataError.
    fn map_reqwest_error(error: reqwest::Error) -> MarketDataError {
        if error.is_timeout() {
            MarketDataError::timeout(format!("Request timed out: {}", error))
        } else if error.is_connect() {
            MarketDataError::connection(format!("Connection failed: {}", error))
        } else if error.is_builder() {
            MarketDataError::invalid_request(format!("Invalid request: {}", error))
        } else {
            MarketDataError::connection(format!("HTTP request failed: {}", error))
        }
    }

    /// Maps a non-success HTTP status to a MarketDataError.
    fn map_status_error(status: StatusCode, body: &str) -> MarketDataError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                MarketDataError::rate_limited(format!("Rate limit exceeded: {}", body))
            }
            s if s.is_server_error() => {
                MarketDataError::connection(format!("Server error ({}): {}", s, body))
            }
            s => MarketDataError::rejected(s.as_u16(), body.to_string()),
        }
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self, url: &str) -> MarketDataResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::protocol(format!("Failed to read body: {}", e)))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Self::map_status_error(status, &body))
        }
    }
}
