//! # Application Services
//!
//! The engine loops and the supervisor that runs them.
//!
//! - [`FetchLoop`]: polls the market data source
//! - [`ResolveLoop`]: applies a [`ResolutionPolicy`] to open trades
//! - [`PersistenceLoop`]: runs a [`FlushPolicy`] against the trade store
//! - [`Engine`]: starts the loops under one cancellation token and joins
//!   them on shutdown
//!
//! Every loop ticks on a fixed interval, races its timer against the shared
//! `CancellationToken` with cancellation taking priority, and returns a
//! [`LoopReport`] when it stops.

pub mod fetcher;
pub mod persistence;
pub mod report;
pub mod resolver;
pub mod supervisor;

pub use fetcher::FetchLoop;
pub use persistence::{FlushPolicy, NoopFlush, PersistenceLoop};
pub use report::{LoopReport, ShutdownReport};
pub use resolver::{NoopResolution, Resolution, ResolutionPolicy, ResolveLoop};
pub use supervisor::{Engine, RunningEngine, shutdown_signal};

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Builds a loop ticker whose first tick fires one full period from now.
///
/// A slow tick delays the schedule rather than producing a burst of
/// catch-up ticks.
pub(crate) fn loop_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
