mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{batch_of, make_raw, FailingClassifier, StubClassifier, StubSource};
use traderscope::analysis::{AnalysisCache, DomainRuleClassifier};
use traderscope::errors::AnalysisError;
use traderscope::models::RiskCategory;

fn cache_with(source: Arc<StubSource>, quality: f64) -> AnalysisCache {
    AnalysisCache::new(source, Arc::new(StubClassifier::new(quality)))
}

#[tokio::test]
async fn test_cold_cache_runs_once_then_serves_cached() {
    let source = Arc::new(StubSource::new(batch_of(12)));
    let cache = cache_with(Arc::clone(&source), 0.5);

    let first = cache.get_or_run(false).await.expect("first run succeeds");
    assert_eq!(first.len(), 12);
    assert_eq!(source.fetches(), 1);

    // Warm hit: no recomputation.
    let second = cache.get_or_run(false).await.expect("cached read succeeds");
    assert_eq!(second.len(), 12);
    assert_eq!(source.fetches(), 1);

    let snapshot = cache.snapshot();
    assert!(snapshot.available());
    assert!(!snapshot.processing);
    assert!(snapshot.timestamp.is_some());
}

#[tokio::test]
async fn test_concurrent_refresh_is_single_flight() {
    let source = Arc::new(
        StubSource::new(batch_of(12)).with_delay(Duration::from_millis(200)),
    );
    let cache = Arc::new(cache_with(Arc::clone(&source), 0.5));

    let runner = Arc::clone(&cache);
    let in_flight = tokio::spawn(async move { runner.get_or_run(true).await });

    // Let the first caller enter the processing state.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(cache.snapshot().processing);

    let second = cache.get_or_run(true).await;
    assert!(matches!(second, Err(AnalysisError::AlreadyInProgress)));

    let first = in_flight.await.expect("task join").expect("pipeline succeeds");
    assert_eq!(first.len(), 12);

    // Exactly one pipeline execution happened.
    assert_eq!(source.fetches(), 1);
    assert!(!cache.snapshot().processing);
}

#[tokio::test]
async fn test_insufficient_data_leaves_cache_idle() {
    let source = Arc::new(StubSource::new(batch_of(5)));
    let cache = cache_with(Arc::clone(&source), 0.5);

    let err = cache.get_or_run(true).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InsufficientData { have: 5, need: 10 }
    ));

    let snapshot = cache.snapshot();
    assert!(!snapshot.available());
    assert!(!snapshot.processing);
    assert!(snapshot.timestamp.is_none());
}

#[tokio::test]
async fn test_failed_refresh_returns_to_idle_then_recovers() {
    let source = Arc::new(StubSource::new(batch_of(12)).failing_first(1));
    let cache = cache_with(Arc::clone(&source), 0.5);

    let err = cache.get_or_run(true).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Upstream(_)));

    let snapshot = cache.snapshot();
    assert!(!snapshot.available());
    assert!(!snapshot.processing);

    // A subsequent call retries cleanly and populates the cache.
    let data = cache.get_or_run(false).await.expect("retry succeeds");
    assert_eq!(data.len(), 12);
    assert!(cache.snapshot().timestamp.is_some());
}

#[tokio::test]
async fn test_failed_refresh_discards_previous_result() {
    let source = Arc::new(StubSource::new(batch_of(12)));
    let cache = cache_with(Arc::clone(&source), 0.5);

    cache.get_or_run(true).await.expect("initial run succeeds");
    assert!(cache.snapshot().available());

    source.fail_next(1);
    let err = cache.get_or_run(true).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Upstream(_)));

    // Old data is gone, not silently served as ready.
    let snapshot = cache.snapshot();
    assert!(!snapshot.available());
    assert!(snapshot.timestamp.is_none());
}

#[tokio::test]
async fn test_refresh_timestamp_is_strictly_newer() {
    let source = Arc::new(StubSource::new(batch_of(12)));
    let cache = cache_with(Arc::clone(&source), 0.5);

    cache.get_or_run(true).await.expect("first run");
    let first_ts = cache.snapshot().timestamp.expect("timestamp set");

    tokio::time::sleep(Duration::from_millis(10)).await;

    cache.get_or_run(true).await.expect("second run");
    let second_ts = cache.snapshot().timestamp.expect("timestamp set");

    assert!(second_ts > first_ts);
}

#[tokio::test]
async fn test_invalidate_forces_recomputation() {
    let source = Arc::new(StubSource::new(batch_of(12)));
    let cache = cache_with(Arc::clone(&source), 0.5);

    cache.get_or_run(false).await.expect("first run");
    assert_eq!(source.fetches(), 1);

    cache.invalidate();
    assert!(!cache.snapshot().available());

    cache.get_or_run(false).await.expect("recompute after invalidate");
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_classifier_failure_propagates_as_upstream() {
    let source = Arc::new(StubSource::new(batch_of(12)));
    let cache = AnalysisCache::new(source.clone(), Arc::new(FailingClassifier));

    let err = cache.get_or_run(true).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Upstream(_)));
    assert!(!cache.snapshot().available());
}

#[tokio::test]
async fn test_classified_output_derived_columns() {
    // win_rate=60, wins=12/losses=6 → profit_factor=2.0 → low risk.
    let source = Arc::new(StubSource::new(batch_of(12)));
    let cache = cache_with(Arc::clone(&source), 0.5);

    let data = cache.get_or_run(true).await.expect("run succeeds");
    for t in data.iter() {
        assert_eq!(t.copy_trading_score, 50.0);
        assert_eq!(t.risk_category, RiskCategory::Low);
        assert_eq!(t.classification_method, "domain_rules");
        assert_eq!(t.persona, "Test Persona");
        assert_eq!(t.features.profit_factor, 2.0);
    }
}

#[tokio::test]
async fn test_bots_excluded_from_results() {
    let mut batch = batch_of(14);
    batch[0].is_bot = true;
    batch[1].is_bot = true;

    let source = Arc::new(StubSource::new(batch));
    let cache = cache_with(Arc::clone(&source), 0.5);

    let data = cache.get_or_run(true).await.expect("run succeeds");
    assert_eq!(data.len(), 12);
}

#[tokio::test]
async fn test_pipeline_with_production_classifier() {
    // End-to-end through the real domain-rule classifier.
    let mut batch = batch_of(12);
    // Make one trader an obvious elite: high win rate, strong profit factor.
    batch[0].win_rate = 72.0;
    batch[0].wins = 36;
    batch[0].losses = 9;
    batch[0].trades = 45;

    let source = Arc::new(StubSource::new(batch));
    let cache = AnalysisCache::new(
        source.clone(),
        Arc::new(DomainRuleClassifier::new(42)),
    );

    let data = cache.get_or_run(true).await.expect("run succeeds");
    let elite = data
        .iter()
        .find(|t| t.features.address == make_raw(0).wallet_address)
        .expect("trader present");

    assert_eq!(elite.persona, "Elite Sniper");
    assert_eq!(elite.risk_category, RiskCategory::Low);
    assert!((0.0..=100.0).contains(&elite.copy_trading_score));
}
