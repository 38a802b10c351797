//! # In-Memory Repositories
//!
//! In-memory implementations for testing without a running Redis.
//!
//! ## Thread Safety
//!
//! Storage is an `Arc<RwLock<HashMap>>` shared by every clone.

pub mod trade_repository;

pub use trade_repository::InMemoryTradeRepository;
