//! # Loop Reports
//!
//! Counters each loop returns when it stops, and the supervisor's summary of
//! a shutdown.

use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// What a loop did before it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    /// Loop name.
    pub name: &'static str,
    /// Timer ticks acted upon.
    pub ticks: u64,
    /// Failures logged and absorbed (fetch errors, store errors, failed
    /// trades).
    pub failures: u64,
}

impl LoopReport {
    /// Creates an empty report for a loop.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            ticks: 0,
            failures: 0,
        }
    }
}

impl fmt::Display for LoopReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ticks, {} failures",
            self.name, self.ticks, self.failures
        )
    }
}

/// Outcome of stopping the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Loops that confirmed shutdown, with their counters.
    pub completed: Vec<LoopReport>,
    /// Loops whose task panicked.
    pub panicked: Vec<&'static str>,
    /// Loops that did not confirm within the grace period and were aborted.
    pub timed_out: Vec<&'static str>,
    /// Time from cancellation to the end of the join.
    pub elapsed: Duration,
}

impl ShutdownReport {
    /// Returns true if every loop confirmed shutdown.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.panicked.is_empty() && self.timed_out.is_empty()
    }

    /// Returns the report of the named loop, if it confirmed shutdown.
    #[must_use]
    pub fn loop_report(&self, name: &str) -> Option<&LoopReport> {
        self.completed.iter().find(|r| r.name == name)
    }

    /// Logs the report: `info!` when clean, `warn!` otherwise.
    pub fn log(&self) {
        for report in &self.completed {
            info!(
                loop_name = report.name,
                ticks = report.ticks,
                failures = report.failures,
                "loop confirmed shutdown"
            );
        }
        if self.is_clean() {
            info!(elapsed_ms = self.elapsed.as_millis() as u64, "all loops stopped");
        } else {
            warn!(
                elapsed_ms = self.elapsed.as_millis() as u64,
                panicked = ?self.panicked,
                timed_out = ?self.timed_out,
                "engine shutdown incomplete"
            );
        }
    }
}
