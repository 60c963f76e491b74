use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::AppError;
use crate::models::ClassifiedTrader;
use crate::AppState;

/// POST /api/v1/analysis/run — force a fresh pipeline run.
pub async fn run(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let data = state.cache.get_or_run(true).await?;
    let snapshot = state.cache.snapshot();

    Ok(Json(json!({
        "status": "success",
        "traders_analyzed": data.len(),
        "timestamp": snapshot.timestamp,
    })))
}

fn default_results_limit() -> usize {
    100
}

#[derive(Deserialize)]
pub struct ResultsParams {
    #[serde(default = "default_results_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    pub persona: Option<String>,
    pub min_copy_trading_score: Option<f64>,
}

/// GET /api/v1/analysis/results — cached results, filtered and paginated.
/// Runs the pipeline first if nothing is cached yet.
pub async fn results(
    State(state): State<AppState>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = state.cache.get_or_run(false).await?;
    let snapshot = state.cache.snapshot();

    let mut filtered: Vec<&ClassifiedTrader> = data
        .iter()
        .filter(|t| params.persona.as_ref().map_or(true, |p| &t.persona == p))
        .filter(|t| {
            params
                .min_copy_trading_score
                .map_or(true, |min| t.copy_trading_score >= min)
        })
        .collect();

    filtered.sort_by(|a, b| b.copy_trading_score.total_cmp(&a.copy_trading_score));
    let filtered_count = filtered.len();

    let limit = params.limit.clamp(1, 1_000);
    let page: Vec<&ClassifiedTrader> =
        filtered.into_iter().skip(params.offset).take(limit).collect();

    Ok(Json(json!({
        "total_results": data.len(),
        "filtered_results": filtered_count,
        "results": page,
        "analysis_timestamp": snapshot.timestamp,
    })))
}

#[derive(Serialize)]
pub struct PersonaStats {
    pub persona: String,
    pub trader_count: usize,
    pub avg_copy_trading_score: f64,
    pub avg_quality_score: f64,
    pub avg_realized_profit: f64,
    pub avg_win_rate: f64,
    pub total_volume: f64,
}

/// GET /api/v1/analysis/personas — aggregate stats per discovered persona,
/// unclassified traders excluded.
pub async fn personas(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = state.cache.get_or_run(false).await?;
    let snapshot = state.cache.snapshot();

    let mut groups: BTreeMap<&str, Vec<&ClassifiedTrader>> = BTreeMap::new();
    for trader in data.iter().filter(|t| t.is_classified()) {
        groups.entry(&trader.persona).or_default().push(trader);
    }

    let classified_count: usize = groups.values().map(|g| g.len()).sum();

    let mut stats: Vec<PersonaStats> = groups
        .into_iter()
        .map(|(persona, traders)| {
            let n = traders.len() as f64;
            PersonaStats {
                persona: persona.to_string(),
                trader_count: traders.len(),
                avg_copy_trading_score: traders.iter().map(|t| t.copy_trading_score).sum::<f64>()
                    / n,
                avg_quality_score: traders.iter().map(|t| t.quality_score).sum::<f64>() / n,
                avg_realized_profit: traders
                    .iter()
                    .map(|t| t.features.realized_pnl)
                    .sum::<f64>()
                    / n,
                avg_win_rate: traders.iter().map(|t| t.features.win_rate).sum::<f64>() / n,
                total_volume: traders.iter().map(|t| t.features.total_volume).sum(),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.trader_count.cmp(&a.trader_count));

    Ok(Json(json!({
        "total_personas": stats.len(),
        "total_classified_traders": classified_count,
        "personas": stats,
        "analysis_timestamp": snapshot.timestamp,
    })))
}

fn default_min_score() -> f64 {
    70.0
}

fn default_recommendations_limit() -> usize {
    50
}

#[derive(Deserialize)]
pub struct RecommendationParams {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_recommendations_limit")]
    pub limit: usize,
}

/// GET /api/v1/analysis/recommendations — top classified traders above a
/// copy-trading score threshold.
pub async fn recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let data = state.cache.get_or_run(false).await?;
    let snapshot = state.cache.snapshot();

    let mut picks: Vec<&ClassifiedTrader> = data
        .iter()
        .filter(|t| t.is_classified() && t.copy_trading_score >= params.min_score)
        .collect();

    picks.sort_by(|a, b| b.copy_trading_score.total_cmp(&a.copy_trading_score));
    picks.truncate(params.limit.clamp(1, 500));

    Ok(Json(json!({
        "total_recommendations": picks.len(),
        "min_score_threshold": params.min_score,
        "recommendations": picks,
        "analysis_timestamp": snapshot.timestamp,
    })))
}

/// GET /api/v1/analysis/status — cache state without triggering a run.
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.cache.snapshot();

    Json(json!({
        "available": snapshot.available(),
        "processing": snapshot.processing,
        "trader_count": snapshot.trader_count,
        "timestamp": snapshot.timestamp,
    }))
}
