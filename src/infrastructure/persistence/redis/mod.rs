//! # Redis Repositories
//!
//! Redis-backed implementations using a lazily-connected
//! `redis::aio::ConnectionManager`.

pub mod trade_repository;

pub use trade_repository::RedisTradeRepository;
