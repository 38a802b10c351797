//! # Trading Engine
//!
//! Skeleton of a trading engine: three periodic loops supervised under a
//! shared cancellation token.
//!
//! - The fetch loop polls a market data URL and logs what came back.
//! - The resolve loop lists trades from the Redis trade store and hands each
//!   open trade to a [`ResolutionPolicy`](application::services::ResolutionPolicy).
//! - The persistence loop runs a [`FlushPolicy`](application::services::FlushPolicy)
//!   against the store.
//!
//! [`Engine`](application::services::Engine) starts the loops and, on
//! shutdown, waits a bounded grace period for each to confirm.
//!
//! ## Layout
//!
//! - [`config`]: environment-driven [`EngineConfig`](config::EngineConfig)
//! - [`domain`]: the [`Trade`](domain::entities::Trade) record
//! - [`infrastructure`]: Redis trade store and HTTP price source
//! - [`application`]: loops, policies and the supervisor

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
