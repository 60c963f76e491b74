use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Database views
        .route("/api/v1/stats", get(handlers::stats::database))
        .route("/api/v1/traders", get(handlers::traders::list))
        .route("/api/v1/traders/top/ranked", get(handlers::traders::top))
        .route("/api/v1/traders/filter", get(handlers::traders::filter))
        .route("/api/v1/traders/:wallet_address", get(handlers::traders::detail))
        // Analysis pipeline
        .route("/api/v1/analysis/run", post(handlers::analysis::run))
        .route("/api/v1/analysis/results", get(handlers::analysis::results))
        .route("/api/v1/analysis/personas", get(handlers::analysis::personas))
        .route(
            "/api/v1/analysis/recommendations",
            get(handlers::analysis::recommendations),
        )
        .route("/api/v1/analysis/status", get(handlers::analysis::status));

    // Open CORS: the dashboard is served from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
