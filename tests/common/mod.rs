use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;

use traderscope::analysis::{PersonaClassifier, TraderSource};
use traderscope::models::{EngineeredTrader, PersonaLabel, RawTrader};

/// Build a plausible non-bot trader row.
#[allow(dead_code)]
pub fn make_raw(i: usize) -> RawTrader {
    RawTrader {
        wallet_address: format!("0xwallet_{i:03}"),
        gross_profit: 1_000.0 + i as f64,
        realized_profit: 800.0,
        realized_profit_percent: 25.0,
        win_rate: 60.0,
        wins: 12,
        losses: 6,
        trade_volume: 50_000.0,
        trades: 18,
        avg_trade_size: 2_500.0,
        is_bot: false,
    }
}

#[allow(dead_code)]
pub fn batch_of(n: usize) -> Vec<RawTrader> {
    (0..n).map(make_raw).collect()
}

/// In-memory data source. Counts fetches, optionally sleeps to keep a
/// pipeline run in flight, and can be told to fail the first N calls.
pub struct StubSource {
    traders: Vec<RawTrader>,
    delay: Duration,
    failures_remaining: AtomicUsize,
    pub fetch_count: AtomicUsize,
}

#[allow(dead_code)]
impl StubSource {
    pub fn new(traders: Vec<RawTrader>) -> Self {
        Self {
            traders,
            delay: Duration::ZERO,
            failures_remaining: AtomicUsize::new(0),
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_first(mut self, n: usize) -> Self {
        self.failures_remaining = AtomicUsize::new(n);
        self
    }

    /// Make the next `n` fetches fail (useful after a successful run).
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl TraderSource for StubSource {
    fn fetch_traders(&self, _exclude_bots: bool) -> BoxFuture<'_, anyhow::Result<Vec<RawTrader>>> {
        Box::pin(async move {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let remaining = self.failures_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
                anyhow::bail!("database unreachable (injected)");
            }

            Ok(self.traders.clone())
        })
    }
}

/// Fixed-output classifier: every trader gets the same persona and scores.
pub struct StubClassifier {
    pub quality_score: f64,
}

#[allow(dead_code)]
impl StubClassifier {
    pub fn new(quality_score: f64) -> Self {
        Self { quality_score }
    }
}

impl PersonaClassifier for StubClassifier {
    fn classify(&self, traders: &[EngineeredTrader]) -> anyhow::Result<Vec<PersonaLabel>> {
        Ok(traders
            .iter()
            .map(|_| PersonaLabel {
                persona: "Test Persona".into(),
                quality_score: self.quality_score,
                persona_confidence: 0.9,
            })
            .collect())
    }
}

/// Classifier that always raises, to exercise the upstream-failure path.
#[allow(dead_code)]
pub struct FailingClassifier;

impl PersonaClassifier for FailingClassifier {
    fn classify(&self, _traders: &[EngineeredTrader]) -> anyhow::Result<Vec<PersonaLabel>> {
        anyhow::bail!("clustering backend exploded (injected)")
    }
}
