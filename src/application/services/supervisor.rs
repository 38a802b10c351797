//! # Engine Supervisor
//!
//! Starts the fetch, persistence and resolve loops under one
//! `CancellationToken` and brings them down together.
//!
//! Shutdown cancels the token, then joins every loop against a single
//! deadline of `shutdown_grace`. Loops that finish in time contribute their
//! [`LoopReport`]; loops that panicked or missed the deadline are named in
//! the [`ShutdownReport`], and stragglers are aborted.
//!
//! # Examples
//!
//! ```ignore
//! use trading_engine::application::services::{Engine, shutdown_signal};
//!
//! let report = Engine::new(config, repository, source)
//!     .run_until(shutdown_signal())
//!     .await;
//! assert!(report.is_clean());
//! ```

use crate::application::services::fetcher::FetchLoop;
use crate::application::services::persistence::{FlushPolicy, NoopFlush, PersistenceLoop};
use crate::application::services::report::{LoopReport, ShutdownReport};
use crate::application::services::resolver::{NoopResolution, ResolutionPolicy, ResolveLoop};
use crate::config::EngineConfig;
use crate::infrastructure::market_data::PriceSource;
use crate::infrastructure::persistence::TradeRepository;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

/// An engine ready to start.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    repository: Arc<dyn TradeRepository>,
    source: Arc<dyn PriceSource>,
    resolution_policy: Arc<dyn ResolutionPolicy>,
    flush_policy: Arc<dyn FlushPolicy>,
}

impl Engine {
    /// Creates an engine with no-op resolution and flush policies.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        repository: Arc<dyn TradeRepository>,
        source: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repository,
            source,
            resolution_policy: Arc::new(NoopResolution),
            flush_policy: Arc::new(NoopFlush),
        }
    }

    /// Sets the policy the resolve loop applies to open trades.
    #[must_use]
    pub fn with_resolution_policy(mut self, policy: Arc<dyn ResolutionPolicy>) -> Self {
        self.resolution_policy = policy;
        self
    }

    /// Sets the policy the persistence loop runs each tick.
    #[must_use]
    pub fn with_flush_policy(mut self, policy: Arc<dyn FlushPolicy>) -> Self {
        self.flush_policy = policy;
        self
    }

    /// Spawns all loops on the current runtime.
    #[must_use]
    pub fn start(self) -> RunningEngine {
        let cancel = CancellationToken::new();

        let fetcher = FetchLoop::new(Arc::clone(&self.config), self.source);
        let persistence = PersistenceLoop::new(Arc::clone(&self.config), Arc::clone(&self.repository))
            .with_policy(self.flush_policy);
        let resolver = ResolveLoop::new(Arc::clone(&self.config), self.repository)
            .with_policy(self.resolution_policy);

        let loops = vec![
            spawn_loop(FetchLoop::NAME, fetcher.run(cancel.clone())),
            spawn_loop(PersistenceLoop::NAME, persistence.run(cancel.clone())),
            spawn_loop(ResolveLoop::NAME, resolver.run(cancel.clone())),
        ];

        info!(
            fetcher_interval_ms = self.config.fetcher_interval().as_millis() as u64,
            resolver_interval_ms = self.config.resolver_interval().as_millis() as u64,
            db_interval_ms = self.config.db_interval().as_millis() as u64,
            "trading engine started"
        );

        RunningEngine {
            cancel,
            loops,
            grace: self.config.shutdown_grace(),
        }
    }

    /// Starts the engine, waits for `signal`, then shuts down.
    pub async fn run_until<F>(self, signal: F) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        let running = self.start();
        tokio::select! {
            () = signal => info!("stop signal received"),
            () = running.cancel.cancelled() => info!("engine cancelled"),
        }
        running.shutdown().await
    }
}

fn spawn_loop<F>(name: &'static str, run: F) -> (&'static str, JoinHandle<LoopReport>)
where
    F: Future<Output = LoopReport> + Send + 'static,
{
    let span = info_span!("loop", loop_name = name);
    (name, tokio::spawn(run.instrument(span)))
}

/// Handle to a started engine.
#[derive(Debug)]
pub struct RunningEngine {
    cancel: CancellationToken,
    loops: Vec<(&'static str, JoinHandle<LoopReport>)>,
    grace: Duration,
}

impl RunningEngine {
    /// Returns a clone of the token shared by every loop.
    ///
    /// Cancelling it stops the loops without joining them; call
    /// [`RunningEngine::shutdown`] to collect the report.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the names of loops whose task has already ended.
    #[must_use]
    pub fn finished_loops(&self) -> Vec<&'static str> {
        self.loops
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Cancels every loop and waits up to the grace period for each to
    /// confirm.
    pub async fn shutdown(self) -> ShutdownReport {
        info!(grace_ms = self.grace.as_millis() as u64, "stopping trading engine");
        self.cancel.cancel();

        let started = Instant::now();
        let deadline = started + self.grace;
        let mut report = ShutdownReport::default();

        for (name, mut handle) in self.loops {
            match timeout_at(deadline, &mut handle).await {
                Ok(Ok(loop_report)) => report.completed.push(loop_report),
                Ok(Err(e)) => {
                    error!(loop_name = name, error = %e, "loop task failed");
                    report.panicked.push(name);
                }
                Err(_) => {
                    handle.abort();
                    report.timed_out.push(name);
                }
            }
        }

        report.elapsed = started.elapsed();
        report.log();
        report
    }
}

/// Completes on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
///
/// If a handler cannot be installed that signal is ignored and an error is
/// logged.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}
