//! End-to-end lifecycle tests for the engine supervisor.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use trading_engine::application::error::ResolveError;
use trading_engine::application::services::{
    Engine, FetchLoop, PersistenceLoop, Resolution, ResolutionPolicy, ResolveLoop,
};
use trading_engine::config::{DEFAULT_SHUTDOWN_GRACE, EngineConfig};
use trading_engine::domain::entities::Trade;
use trading_engine::domain::value_objects::Timestamp;
use trading_engine::infrastructure::market_data::{
    HttpPriceSource, MarketDataError, MarketDataResult, PriceSource,
};
use trading_engine::infrastructure::persistence::in_memory::InMemoryTradeRepository;
use trading_engine::infrastructure::persistence::{
    RetryPolicy, RetryingTradeRepository, TradeRepository,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug)]
struct OfflineSource;

#[async_trait]
impl PriceSource for OfflineSource {
    async fn fetch(&self, _url: &str) -> MarketDataResult<String> {
        Err(MarketDataError::connection("offline"))
    }
}

/// 200 on even requests, 500 on odd ones.
struct Alternating {
    served: AtomicUsize,
}

impl Respond for Alternating {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        if self.served.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
            ResponseTemplate::new(200).set_body_string(r#"{"symbol":"SOLUSDC","price":"142.37"}"#)
        } else {
            ResponseTemplate::new(500).set_body_string("upstream unavailable")
        }
    }
}

/// Closes every open trade it sees.
#[derive(Debug, Default)]
struct CloseAll {
    closed: AtomicUsize,
}

#[async_trait]
impl ResolutionPolicy for CloseAll {
    async fn resolve(&self, trade: &Trade) -> Result<Resolution, ResolveError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(Resolution::Updated(trade.with_status(Trade::STATUS_CLOSED)))
    }

    fn name(&self) -> &'static str {
        "CloseAll"
    }
}

#[tokio::test]
async fn default_engine_stops_within_grace_period() {
    let engine = Engine::new(
        EngineConfig::default(),
        Arc::new(InMemoryTradeRepository::new()),
        Arc::new(OfflineSource),
    );

    let started = Instant::now();
    let report = engine.start().shutdown().await;

    assert!(started.elapsed() < DEFAULT_SHUTDOWN_GRACE + Duration::from_millis(250));
    assert!(report.is_clean());
    for name in [FetchLoop::NAME, ResolveLoop::NAME, PersistenceLoop::NAME] {
        assert!(report.loop_report(name).is_some(), "{name} did not confirm");
    }
}

#[tokio::test]
async fn fetcher_keeps_polling_through_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(Alternating {
            served: AtomicUsize::new(0),
        })
        .mount(&server)
        .await;

    let config = EngineConfig::default()
        .with_fetcher_interval(Duration::from_millis(10))
        .with_url(format!("{}/api/v3/ticker/price", server.uri()));
    let source = HttpPriceSource::new(config.http_timeout()).unwrap();
    let running = Engine::new(
        config,
        Arc::new(InMemoryTradeRepository::new()),
        Arc::new(source),
    )
    .start();

    tokio::time::sleep(Duration::from_millis(120)).await;
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() >= 5, "only {} requests", requests.len());
    assert!(running.finished_loops().is_empty());

    let report = running.shutdown().await;
    let fetcher = report.loop_report(FetchLoop::NAME).unwrap();
    assert!(fetcher.failures >= 2);
    assert!(fetcher.ticks > fetcher.failures);
}

#[tokio::test]
async fn resolution_policy_updates_the_store() {
    let store = InMemoryTradeRepository::new();
    for (id, status) in [("t-1", "open"), ("t-2", "open"), ("t-3", "closed")] {
        let trade = Trade::new(id, 10.0, Timestamp::now(), status);
        store.save(&trade).await.unwrap();
    }
    // Clones share storage, so `store` observes what the engine writes.
    let repository = Arc::new(RetryingTradeRepository::new(
        store.clone(),
        RetryPolicy::store(),
    ));
    let policy = Arc::new(CloseAll::default());

    let config = EngineConfig::default().with_resolver_interval(Duration::from_millis(10));
    let report = Engine::new(config, repository, Arc::new(OfflineSource))
        .with_resolution_policy(policy.clone())
        .run_until(tokio::time::sleep(Duration::from_millis(60)))
        .await;

    assert!(report.is_clean());
    assert_eq!(policy.closed.load(Ordering::SeqCst), 2);
    let trades = store.list_all().await.unwrap();
    assert_eq!(trades.len(), 3);
    assert!(trades.iter().all(|t| !t.is_open()));
}
