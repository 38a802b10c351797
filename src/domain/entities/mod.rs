//! # Domain Entities
//!
//! - [`Trade`]: a trade record as held in the trade store

pub mod trade;

pub use trade::Trade;
