//! # Market Data
//!
//! Access to the external price source.
//!
//! - [`PriceSource`]: port fetching raw text from a URL
//! - [`HttpPriceSource`]: reqwest-backed implementation
//! - [`MarketDataError`]: error taxonomy for fetch failures

pub mod error;
pub mod http_client;
pub mod traits;

pub use error::{MarketDataError, MarketDataResult};
pub use http_client::HttpPriceSource;
pub use traits::PriceSource;
