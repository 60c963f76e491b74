use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::trader_repo;
use crate::errors::AppError;
use crate::models::DatabaseStats;
use crate::AppState;

#[derive(Serialize)]
pub struct AnalysisSummary {
    #[serde(flatten)]
    pub database: DatabaseStats,
    pub analysis_available: bool,
    pub last_analysis: Option<DateTime<Utc>>,
}

/// GET /api/v1/stats — database totals plus the cache's last-analysis marker.
pub async fn database(State(state): State<AppState>) -> Result<Json<AnalysisSummary>, AppError> {
    let database = trader_repo::get_database_stats(&state.db).await?;
    let snapshot = state.cache.snapshot();

    Ok(Json(AnalysisSummary {
        database,
        analysis_available: snapshot.available(),
        last_analysis: snapshot.timestamp,
    }))
}
