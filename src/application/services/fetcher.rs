//! # Fetch Loop
//!
//! Polls the configured market data URL on a fixed interval.
//!
//! Each tick fetches once, logs how long the call took, and logs the payload
//! on success. A failed fetch is logged and the loop carries on with the next
//! tick. A fetch already in flight when cancellation arrives is allowed to
//! finish; it is bounded by the HTTP client timeout.

use crate::application::services::loop_ticker;
use crate::application::services::report::LoopReport;
use crate::config::EngineConfig;
use crate::infrastructure::market_data::PriceSource;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodic market data fetcher.
#[derive(Debug, Clone)]
pub struct FetchLoop {
    config: Arc<EngineConfig>,
    source: Arc<dyn PriceSource>,
}

impl FetchLoop {
    /// Loop name used in logs and reports.
    pub const NAME: &'static str = "fetcher";

    /// Creates a fetch loop.
    #[must_use]
    pub fn new(config: Arc<EngineConfig>, source: Arc<dyn PriceSource>) -> Self {
        Self { config, source }
    }

    /// Runs until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> LoopReport {
        let mut report = LoopReport::new(Self::NAME);
        let mut ticker = loop_ticker(self.config.fetcher_interval());
        let url = self.config.url();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            report.ticks += 1;
            let started = Instant::now();
            let result = self.source.fetch(url).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            info!(elapsed_ms, "fetch completed");

            match result {
                Ok(payload) => debug!(%payload, "fetched data"),
                Err(e) => {
                    report.failures += 1;
                    warn!(error = %e, retryable = e.is_retryable(), url, "error fetching data");
                }
            }
        }

        info!(ticks = report.ticks, failures = report.failures, "fetcher stopped");
        report
    }
}
