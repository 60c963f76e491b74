use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use metrics::{counter, gauge, histogram};

use crate::analysis::features;
use crate::analysis::persona::PersonaClassifier;
use crate::analysis::risk::classify_risk;
use crate::errors::AnalysisError;
use crate::models::{
    ClassifiedTrader, EngineeredTrader, PersonaLabel, RawTrader, CLASSIFICATION_METHOD,
};

/// Data-access collaborator boundary: yields raw trader rows.
pub trait TraderSource: Send + Sync {
    fn fetch_traders(&self, exclude_bots: bool) -> BoxFuture<'_, anyhow::Result<Vec<RawTrader>>>;
}

/// Read-only view of the cache for status surfaces.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub trader_count: Option<usize>,
    pub timestamp: Option<DateTime<Utc>>,
    pub processing: bool,
}

impl CacheSnapshot {
    pub fn available(&self) -> bool {
        self.trader_count.is_some()
    }
}

struct CacheInner {
    data: Option<Arc<Vec<ClassifiedTrader>>>,
    timestamp: Option<DateTime<Utc>>,
    processing: bool,
}

/// Single-flight result cache for the analysis pipeline.
///
/// States: idle (no data), processing (one pipeline run in flight), ready
/// (data + timestamp). At most one pipeline runs at a time; a second caller
/// arriving mid-run is rejected with `AlreadyInProgress` rather than queued.
/// Readers only ever see a complete result set; a failed refresh drops the
/// previous result and returns the cache to idle.
pub struct AnalysisCache {
    source: Arc<dyn TraderSource>,
    classifier: Arc<dyn PersonaClassifier>,
    inner: Mutex<CacheInner>,
}

impl AnalysisCache {
    pub fn new(source: Arc<dyn TraderSource>, classifier: Arc<dyn PersonaClassifier>) -> Self {
        Self {
            source,
            classifier,
            inner: Mutex::new(CacheInner {
                data: None,
                timestamp: None,
                processing: false,
            }),
        }
    }

    /// Return cached results, or run the full pipeline when there are none
    /// (or when `force_refresh` is set).
    pub async fn get_or_run(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<Vec<ClassifiedTrader>>, AnalysisError> {
        // Check-then-set under one lock so two callers cannot both enter
        // the processing state.
        {
            let mut inner = self.lock();

            if !force_refresh {
                if let Some(data) = &inner.data {
                    return Ok(Arc::clone(data));
                }
            }

            if inner.processing {
                return Err(AnalysisError::AlreadyInProgress);
            }
            inner.processing = true;
        }

        let result = self.run_pipeline().await;

        let mut inner = self.lock();
        inner.processing = false;
        match result {
            Ok(data) => {
                let data = Arc::new(data);
                inner.data = Some(Arc::clone(&data));
                inner.timestamp = Some(Utc::now());
                tracing::info!(
                    traders = data.len(),
                    "Analysis complete and cached"
                );
                Ok(data)
            }
            Err(e) => {
                // Back to idle: a failed refresh must not keep serving the
                // old result set as ready.
                inner.data = None;
                inner.timestamp = None;
                counter!("analysis_failures_total").increment(1);
                tracing::error!(error = %e, "Analysis run failed");
                Err(e)
            }
        }
    }

    /// Drop any cached result, returning the cache to idle. A run already
    /// in flight is unaffected.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        inner.data = None;
        inner.timestamp = None;
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let inner = self.lock();
        CacheSnapshot {
            trader_count: inner.data.as_ref().map(|d| d.len()),
            timestamp: inner.timestamp,
            processing: inner.processing,
        }
    }

    async fn run_pipeline(&self) -> Result<Vec<ClassifiedTrader>, AnalysisError> {
        let started = Instant::now();
        counter!("analysis_runs_total").increment(1);
        tracing::info!("Running new analysis from database");

        let raw = self
            .source
            .fetch_traders(true)
            .await
            .map_err(AnalysisError::Upstream)?;

        let engineered = features::engineer(raw)?;

        let labels = self
            .classifier
            .classify(&engineered)
            .map_err(AnalysisError::Upstream)?;

        let classified: Vec<ClassifiedTrader> = engineered
            .into_iter()
            .zip(labels)
            .map(|(features, label)| finalize(features, label))
            .collect();

        gauge!("analyzed_traders").set(classified.len() as f64);
        histogram!("analysis_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(classified)
    }
}

impl AnalysisCache {
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // Recover from poisoning: the guarded state is always left
        // consistent before any code that could panic.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Attach the derived scoring columns to one labelled row.
fn finalize(features: EngineeredTrader, label: PersonaLabel) -> ClassifiedTrader {
    let risk_category = classify_risk(features.win_rate, features.profit_factor);
    ClassifiedTrader {
        copy_trading_score: label.quality_score * 100.0,
        risk_category,
        classification_method: CLASSIFICATION_METHOD.to_string(),
        persona: label.persona,
        quality_score: label.quality_score,
        persona_confidence: label.persona_confidence,
        features,
    }
}
