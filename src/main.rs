use std::sync::Arc;

use traderscope::analysis::{AnalysisCache, DomainRuleClassifier};
use traderscope::api::router::create_router;
use traderscope::config::AppConfig;
use traderscope::db::{self, SqlTraderSource};
use traderscope::{metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    // Analysis pipeline: SQL source → feature engineering → domain-rule
    // classification, behind the single-flight cache.
    let source = Arc::new(SqlTraderSource::new(db.clone()));
    let classifier = Arc::new(DomainRuleClassifier::new(config.random_state));
    let cache = Arc::new(AnalysisCache::new(source, classifier));

    let state = AppState {
        db,
        config,
        cache,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
