pub mod analysis;
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;

use std::sync::Arc;

use crate::analysis::AnalysisCache;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::MySqlPool,
    pub config: AppConfig,
    pub cache: Arc<AnalysisCache>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
