use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db::trader_repo::{self, TraderFilter};
use crate::errors::AppError;
use crate::models::RawTrader;
use crate::AppState;

fn default_true() -> bool {
    true
}

fn default_limit() -> i64 {
    100
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default = "default_true")]
    pub exclude_bots: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: usize,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RawTrader>>, AppError> {
    let limit = params.limit.clamp(1, 1_000) as usize;
    let traders = trader_repo::fetch_all_traders(&state.db, params.exclude_bots).await?;

    let page: Vec<RawTrader> = traders
        .into_iter()
        .skip(params.offset)
        .take(limit)
        .collect();

    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<RawTrader>, AppError> {
    let trader = trader_repo::get_trader_by_address(&state.db, &wallet_address)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trader {wallet_address} not found")))?;

    Ok(Json(trader))
}

fn default_sort_by() -> String {
    "realized_profit".into()
}

fn default_top_limit() -> i64 {
    50
}

#[derive(Deserialize)]
pub struct TopParams {
    #[serde(default = "default_top_limit")]
    pub limit: i64,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_true")]
    pub exclude_bots: bool,
}

pub async fn top(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> Result<Json<Vec<RawTrader>>, AppError> {
    let limit = params.limit.clamp(1, 500);
    let traders =
        trader_repo::get_top_traders(&state.db, limit, &params.sort_by, params.exclude_bots)
            .await?;

    Ok(Json(traders))
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub min_win_rate: Option<f64>,
    pub min_trades: Option<i64>,
    pub min_volume: Option<f64>,
    pub min_profit: Option<f64>,
    #[serde(default = "default_true")]
    pub exclude_bots: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub async fn filter(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<RawTrader>>, AppError> {
    if params.min_win_rate.is_some_and(|v| !(0.0..=100.0).contains(&v)) {
        return Err(AppError::BadRequest(
            "min_win_rate must be between 0 and 100".into(),
        ));
    }

    let filter = TraderFilter {
        min_win_rate: params.min_win_rate,
        min_trades: params.min_trades,
        min_volume: params.min_volume,
        min_profit: params.min_profit,
        exclude_bots: params.exclude_bots,
    };

    let limit = params.limit.clamp(1, 1_000);
    let traders = trader_repo::filter_traders(&state.db, &filter, limit).await?;

    Ok(Json(traders))
}
