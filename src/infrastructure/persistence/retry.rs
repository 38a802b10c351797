//! # Retrying Repository
//!
//! Bounded retry with jittered exponential backoff at the store boundary.
//!
//! [`RetryingTradeRepository`] wraps any [`TradeRepository`] and retries
//! operations that fail with a retryable [`RepositoryError`]. Decode failures
//! and other permanent errors are returned on the first attempt.

use crate::domain::entities::Trade;
use crate::infrastructure::persistence::traits::{
    RepositoryError, RepositoryResult, TradeRepository,
};
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Jittered exponential backoff policy for async operations.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Fraction of each delay applied as random spread, in `[0, 1]`.
    pub jitter_pct: f64,
}

impl RetryPolicy {
    /// Creates a policy, clamping inputs into a usable range.
    #[must_use]
    pub fn new(max_attempts: usize, base_delay_ms: u64, max_delay_ms: u64, jitter_pct: f64) -> Self {
        let base_delay_ms = base_delay_ms.max(1);
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms: max_delay_ms.max(base_delay_ms),
            jitter_pct: jitter_pct.clamp(0.0, 1.0),
        }
    }

    /// Policy for the trade store: short delays so a loop tick is not held
    /// up for long.
    #[must_use]
    pub fn store() -> Self {
        Self::new(3, 50, 400, 0.2)
    }

    /// Returns the delay to wait after the given zero-based failed attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exp = 2_u64.saturating_pow(u32::try_from(attempt).unwrap_or(u32::MAX));
        let delay = self.base_delay_ms.saturating_mul(exp).min(self.max_delay_ms);
        let spread = (delay as f64 * self.jitter_pct) as i64;
        let jittered = if spread > 0 {
            let delta = rand::rng().random_range(-spread..=spread);
            delay.saturating_add_signed(delta)
        } else {
            delay
        };
        Duration::from_millis(jittered)
    }

    /// Runs `op` until it succeeds, fails with an error `retryable` rejects,
    /// or the attempt budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `op`.
    pub async fn retry_async<F, Fut, T, E, P>(&self, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(val) => return Ok(val),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts || !retryable(&err) {
                        return Err(err);
                    }
                    sleep(self.delay_for(attempt - 1)).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::store()
    }
}

/// [`TradeRepository`] decorator that retries transient failures.
#[derive(Debug, Clone)]
pub struct RetryingTradeRepository<R> {
    inner: R,
    policy: RetryPolicy,
}

impl<R: TradeRepository> RetryingTradeRepository<R> {
    /// Wraps a repository with the given policy.
    #[must_use]
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, op: F) -> RepositoryResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RepositoryResult<T>>,
    {
        let max_attempts = self.policy.max_attempts;
        self.policy
            .retry_async(
                |attempt| {
                    if attempt > 0 {
                        warn!(operation, attempt, max_attempts, "retrying trade store call");
                    }
                    op()
                },
                RepositoryError::is_retryable,
            )
            .await
    }
}

#[async_trait]
impl<R: TradeRepository> TradeRepository for RetryingTradeRepository<R> {
    async fn list_all(&self) -> RepositoryResult<Vec<Trade>> {
        self.with_retry("list_all", || self.inner.list_all()).await
    }

    async fn get(&self, id: &str) -> RepositoryResult<Option<Trade>> {
        self.with_retry("get", || self.inner.get(id)).await
    }

    async fn save(&self, trade: &Trade) -> RepositoryResult<()> {
        self.with_retry("save", || self.inner.save(trade)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::timestamp::Timestamp;
    use crate::infrastructure::persistence::in_memory::InMemoryTradeRepository;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails `list_all` with the given error kind for the first `failures` calls.
    #[derive(Debug)]
    struct Flaky {
        inner: InMemoryTradeRepository,
        failures: usize,
        permanent: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TradeRepository for Flaky {
        async fn list_all(&self) -> RepositoryResult<Vec<Trade>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(if self.permanent {
                    RepositoryError::serialization("bad record")
                } else {
                    RepositoryError::connection("connection reset")
                });
            }
            self.inner.list_all().await
        }

        async fn get(&self, id: &str) -> RepositoryResult<Option<Trade>> {
            self.inner.get(id).await
        }

        async fn save(&self, trade: &Trade) -> RepositoryResult<()> {
            self.inner.save(trade).await
        }
    }

    fn flaky(failures: usize, permanent: bool) -> (Flaky, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Flaky {
                inner: InMemoryTradeRepository::new(),
                failures,
                permanent,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[test]
    fn new_clamps_input_parameters() {
        let policy = RetryPolicy::new(0, 0, 0, 2.0);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay_ms, 1);
        assert_eq!(policy.max_delay_ms, 1);
        assert_eq!(policy.jitter_pct, 1.0);
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 500, 0.0);
        let delays: Vec<_> = (0..5).map(|attempt| policy.delay_for(attempt)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(500),
                Duration::from_millis(500),
            ]
        );
    }

    #[test]
    fn jitter_stays_within_spread() {
        let policy = RetryPolicy::new(3, 100, 100, 0.5);
        for _ in 0..100 {
            let d = policy.delay_for(0).as_millis();
            assert!((50..=150).contains(&d), "delay {d} out of range");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_connection_errors_until_success() {
        let (repo, calls) = flaky(2, false);
        repo.inner
            .save(&Trade::new("t", 1.0, Timestamp::now(), "open"))
            .await
            .unwrap();
        let repo = RetryingTradeRepository::new(repo, RetryPolicy::new(3, 10, 10, 0.0));

        let trades = repo.list_all().await.unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let (repo, calls) = flaky(10, false);
        let repo = RetryingTradeRepository::new(repo, RetryPolicy::new(3, 10, 10, 0.0));

        let err = repo.list_all().await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_retries_decode_errors() {
        let (repo, calls) = flaky(10, true);
        let repo = RetryingTradeRepository::new(repo, RetryPolicy::new(5, 10, 10, 0.0));

        let err = repo.list_all().await.unwrap_err();

        assert!(matches!(err, RepositoryError::Serialization(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
