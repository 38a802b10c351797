//! # Resolve Loop
//!
//! Applies a [`ResolutionPolicy`] to every open trade on a fixed interval.
//!
//! On each tick the loop lists the trade store, keeps trades whose status is
//! `open`, and resolves each one in its own task. Trades the policy changes
//! are written back to the store. A failing or panicking trade is logged and
//! counted without affecting the others on the same tick; a failed listing
//! skips the tick.
//!
//! Cancellation is raced against the listing and against every per-trade
//! join. When it fires mid-tick the outstanding per-trade tasks are aborted
//! and awaited before [`ResolveLoop::run`] returns.
//!
//! # Examples
//!
//! ```ignore
//! use trading_engine::application::services::{ResolveLoop, Resolution, ResolutionPolicy};
//!
//! #[derive(Debug)]
//! struct CloseEverything;
//!
//! #[async_trait::async_trait]
//! impl ResolutionPolicy for CloseEverything {
//!     async fn resolve(&self, trade: &Trade) -> Result<Resolution, ResolveError> {
//!         Ok(Resolution::Updated(trade.with_status(Trade::STATUS_CLOSED)))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "CloseEverything"
//!     }
//! }
//!
//! let resolver = ResolveLoop::new(config, repository).with_policy(Arc::new(CloseEverything));
//! ```

use crate::application::error::ResolveError;
use crate::application::services::loop_ticker;
use crate::application::services::report::LoopReport;
use crate::config::EngineConfig;
use crate::domain::entities::Trade;
use crate::infrastructure::persistence::TradeRepository;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of resolving one trade.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing to write back.
    Unchanged,
    /// The trade changed and should be saved.
    Updated(Trade),
}

/// Business rule deciding what happens to an open trade.
#[async_trait]
pub trait ResolutionPolicy: Send + Sync + fmt::Debug {
    /// Resolves a single open trade.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the trade cannot be resolved this tick.
    async fn resolve(&self, trade: &Trade) -> Result<Resolution, ResolveError>;

    /// Returns the name of this policy.
    fn name(&self) -> &'static str;
}

/// Policy that leaves every trade untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolution;

#[async_trait]
impl ResolutionPolicy for NoopResolution {
    async fn resolve(&self, _trade: &Trade) -> Result<Resolution, ResolveError> {
        Ok(Resolution::Unchanged)
    }

    fn name(&self) -> &'static str {
        "Noop"
    }
}

/// Counters for one resolve tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TickOutcome {
    updated: u64,
    failed: u64,
}

/// Periodic trade resolver.
#[derive(Debug, Clone)]
pub struct ResolveLoop {
    config: Arc<EngineConfig>,
    repository: Arc<dyn TradeRepository>,
    policy: Arc<dyn ResolutionPolicy>,
}

impl ResolveLoop {
    /// Loop name used in logs and reports.
    pub const NAME: &'static str = "resolver";

    /// Creates a resolve loop with the no-op policy.
    #[must_use]
    pub fn new(config: Arc<EngineConfig>, repository: Arc<dyn TradeRepository>) -> Self {
        Self {
            config,
            repository,
            policy: Arc::new(NoopResolution),
        }
    }

    /// Sets the resolution policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn ResolutionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the name of the active policy.
    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> LoopReport {
        let mut report = LoopReport::new(Self::NAME);
        let mut ticker = loop_ticker(self.config.resolver_interval());
        debug!(policy = self.policy.name(), "resolver starting");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            report.ticks += 1;
            match self.resolve_tick(&cancel).await {
                Some(outcome) => report.failures += outcome.failed,
                None => break,
            }
        }

        info!(ticks = report.ticks, failures = report.failures, "resolver stopped");
        report
    }

    /// Resolves every open trade once. Returns `None` if cancelled mid-tick.
    async fn resolve_tick(&self, cancel: &CancellationToken) -> Option<TickOutcome> {
        let mut outcome = TickOutcome::default();

        let listed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            listed = self.repository.list_all() => listed,
        };
        let trades = match listed {
            Ok(trades) => trades,
            Err(e) => {
                error!(error = %e, "failed to list trades, skipping tick");
                outcome.failed += 1;
                return Some(outcome);
            }
        };

        let mut tasks = JoinSet::new();
        for trade in trades.into_iter().filter(Trade::is_open) {
            let policy = Arc::clone(&self.policy);
            let repository = Arc::clone(&self.repository);
            tasks.spawn(async move {
                let result = resolve_one(policy.as_ref(), repository.as_ref(), &trade).await;
                (trade, result)
            });
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.shutdown().await;
                    return None;
                }
                joined = tasks.join_next() => joined,
            };
            match joined {
                None => break,
                Some(Ok((_, Ok(Resolution::Unchanged)))) => {}
                Some(Ok((trade, Ok(Resolution::Updated(_))))) => {
                    outcome.updated += 1;
                    debug!(trade_id = trade.id(), "trade resolved");
                }
                Some(Ok((trade, Err(e)))) => {
                    outcome.failed += 1;
                    warn!(trade_id = trade.id(), error = %e, "failed to resolve trade");
                }
                Some(Err(e)) => {
                    outcome.failed += 1;
                    error!(error = %e, "resolution task panicked");
                }
            }
        }

        if outcome.updated > 0 || outcome.failed > 0 {
            info!(updated = outcome.updated, failed = outcome.failed, "resolve tick finished");
        }
        Some(outcome)
    }
}

async fn resolve_one(
    policy: &dyn ResolutionPolicy,
    repository: &dyn TradeRepository,
    trade: &Trade,
) -> Result<Resolution, ResolveError> {
    let resolution = policy.resolve(trade).await?;
    if let Resolution::Updated(updated) = &resolution {
        repository.save(updated).await?;
    }
    Ok(resolution)
}
