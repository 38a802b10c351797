//! # Persistence Loop
//!
//! Runs a [`FlushPolicy`] against the trade store on a fixed interval.
//!
//! With the default [`NoopFlush`] this loop only observes the engine's
//! lifecycle. A write-behind or snapshot policy plugs in here without
//! touching the scheduling or shutdown logic. A flush in progress when
//! cancellation arrives is allowed to finish.

use crate::application::error::FlushError;
use crate::application::services::loop_ticker;
use crate::application::services::report::LoopReport;
use crate::config::EngineConfig;
use crate::infrastructure::persistence::TradeRepository;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Work performed against the trade store on each persistence tick.
#[async_trait]
pub trait FlushPolicy: Send + Sync + fmt::Debug {
    /// Flushes pending state through `repository`.
    ///
    /// # Errors
    ///
    /// Returns `FlushError` if the flush fails; the loop logs it and retries
    /// on the next tick.
    async fn flush(&self, repository: &dyn TradeRepository) -> Result<(), FlushError>;

    /// Returns the name of this policy.
    fn name(&self) -> &'static str;
}

/// Policy that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFlush;

#[async_trait]
impl FlushPolicy for NoopFlush {
    async fn flush(&self, _repository: &dyn TradeRepository) -> Result<(), FlushError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Noop"
    }
}

/// Periodic persistence worker.
#[derive(Debug, Clone)]
pub struct PersistenceLoop {
    config: Arc<EngineConfig>,
    repository: Arc<dyn TradeRepository>,
    policy: Arc<dyn FlushPolicy>,
}

impl PersistenceLoop {
    /// Loop name used in logs and reports.
    pub const NAME: &'static str = "persistence";

    /// Creates a persistence loop with the no-op policy.
    #[must_use]
    pub fn new(config: Arc<EngineConfig>, repository: Arc<dyn TradeRepository>) -> Self {
        Self {
            config,
            repository,
            policy: Arc::new(NoopFlush),
        }
    }

    /// Sets the flush policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn FlushPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> LoopReport {
        let mut report = LoopReport::new(Self::NAME);
        let mut ticker = loop_ticker(self.config.db_interval());

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            report.ticks += 1;
            if let Err(e) = self.policy.flush(self.repository.as_ref()).await {
                report.failures += 1;
                warn!(policy = self.policy.name(), error = %e, "flush failed");
            }
        }

        info!(ticks = report.ticks, failures = report.failures, "persistence stopped");
        report
    }
}
