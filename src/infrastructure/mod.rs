//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - `market_data`: HTTP price source polled by the fetch loop
//! - `persistence`: trade store backed by Redis, with an in-memory variant

pub mod market_data;
pub mod persistence;
