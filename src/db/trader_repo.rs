use futures_util::future::BoxFuture;
use sqlx::{MySqlPool, QueryBuilder};

use crate::analysis::TraderSource;
use crate::models::{DatabaseStats, RawTrader};

/// Explicit column list with boundary defaults: numeric NULLs become 0 so
/// nothing downstream has to reason about missing storage values.
const TRADER_COLUMNS: &str = r#"
    wallet_address,
    COALESCE(gross_profit, 0) AS gross_profit,
    COALESCE(realized_profit, 0) AS realized_profit,
    COALESCE(realized_profit_percent, 0) AS realized_profit_percent,
    COALESCE(win_rate, 0) AS win_rate,
    COALESCE(wins, 0) AS wins,
    COALESCE(losses, 0) AS losses,
    COALESCE(trade_volume, 0) AS trade_volume,
    COALESCE(trades, 0) AS trades,
    COALESCE(avg_trade_size, 0) AS avg_trade_size,
    COALESCE(is_bot, 0) AS is_bot
"#;

/// Sortable columns for the ranked listing. Anything else falls back to
/// `realized_profit`.
const SORTABLE_COLUMNS: &[&str] = &[
    "gross_profit",
    "realized_profit",
    "realized_profit_percent",
    "win_rate",
    "trade_volume",
    "trades",
];

/// Fetch every trader row, optionally excluding bot accounts.
pub async fn fetch_all_traders(
    pool: &MySqlPool,
    exclude_bots: bool,
) -> anyhow::Result<Vec<RawTrader>> {
    let mut query = format!("SELECT {TRADER_COLUMNS} FROM traders");
    if exclude_bots {
        query.push_str(" WHERE is_bot = 0");
    }

    let traders = sqlx::query_as::<_, RawTrader>(&query).fetch_all(pool).await?;

    tracing::info!(traders = traders.len(), "Retrieved traders from database");
    Ok(traders)
}

/// Fetch a single trader by wallet address.
pub async fn get_trader_by_address(
    pool: &MySqlPool,
    wallet_address: &str,
) -> anyhow::Result<Option<RawTrader>> {
    let query = format!("SELECT {TRADER_COLUMNS} FROM traders WHERE wallet_address = ?");

    let trader = sqlx::query_as::<_, RawTrader>(&query)
        .bind(wallet_address)
        .fetch_optional(pool)
        .await?;

    Ok(trader)
}

/// Fetch the top traders ordered by one of the whitelisted metrics.
pub async fn get_top_traders(
    pool: &MySqlPool,
    limit: i64,
    sort_by: &str,
    exclude_bots: bool,
) -> anyhow::Result<Vec<RawTrader>> {
    let sort_column = if SORTABLE_COLUMNS.contains(&sort_by) {
        sort_by
    } else {
        "realized_profit"
    };

    let mut query = format!("SELECT {TRADER_COLUMNS} FROM traders");
    if exclude_bots {
        query.push_str(" WHERE is_bot = 0");
    }
    query.push_str(&format!(" ORDER BY {sort_column} DESC LIMIT ?"));

    let traders = sqlx::query_as::<_, RawTrader>(&query)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(traders)
}

/// Optional lower bounds for the filtered listing.
#[derive(Debug, Clone, Default)]
pub struct TraderFilter {
    pub min_win_rate: Option<f64>,
    pub min_trades: Option<i64>,
    pub min_volume: Option<f64>,
    pub min_profit: Option<f64>,
    pub exclude_bots: bool,
}

/// Fetch traders matching every provided bound.
pub async fn filter_traders(
    pool: &MySqlPool,
    filter: &TraderFilter,
    limit: i64,
) -> anyhow::Result<Vec<RawTrader>> {
    let mut builder: QueryBuilder<sqlx::MySql> =
        QueryBuilder::new(format!("SELECT {TRADER_COLUMNS} FROM traders WHERE 1 = 1"));

    if filter.exclude_bots {
        builder.push(" AND is_bot = 0");
    }
    if let Some(min_win_rate) = filter.min_win_rate {
        builder.push(" AND win_rate >= ").push_bind(min_win_rate);
    }
    if let Some(min_trades) = filter.min_trades {
        builder.push(" AND trades >= ").push_bind(min_trades);
    }
    if let Some(min_volume) = filter.min_volume {
        builder.push(" AND trade_volume >= ").push_bind(min_volume);
    }
    if let Some(min_profit) = filter.min_profit {
        builder.push(" AND realized_profit >= ").push_bind(min_profit);
    }
    builder.push(" LIMIT ").push_bind(limit);

    let traders = builder
        .build_query_as::<RawTrader>()
        .fetch_all(pool)
        .await?;

    tracing::info!(traders = traders.len(), "Retrieved traders matching filters");
    Ok(traders)
}

/// Aggregate table statistics; averages and sums cover non-bot rows only.
pub async fn get_database_stats(pool: &MySqlPool) -> anyhow::Result<DatabaseStats> {
    let (total_traders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM traders")
        .fetch_one(pool)
        .await?;

    let (non_bot_traders,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM traders WHERE is_bot = 0")
            .fetch_one(pool)
            .await?;

    let row: (f64, f64, f64, f64, f64, f64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(AVG(win_rate), 0),
            COALESCE(AVG(trades), 0),
            COALESCE(AVG(trade_volume), 0),
            COALESCE(AVG(realized_profit), 0),
            COALESCE(SUM(realized_profit), 0),
            COALESCE(SUM(trade_volume), 0)
        FROM traders
        WHERE is_bot = 0
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(DatabaseStats {
        total_traders,
        non_bot_traders,
        bot_traders: total_traders - non_bot_traders,
        avg_win_rate: row.0,
        avg_trades: row.1,
        avg_volume: row.2,
        avg_profit: row.3,
        total_profit: row.4,
        total_volume: row.5,
    })
}

/// SQL-backed implementation of the pipeline's data-access boundary.
#[derive(Clone)]
pub struct SqlTraderSource {
    pool: MySqlPool,
}

impl SqlTraderSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl TraderSource for SqlTraderSource {
    fn fetch_traders(&self, exclude_bots: bool) -> BoxFuture<'_, anyhow::Result<Vec<RawTrader>>> {
        Box::pin(async move { fetch_all_traders(&self.pool, exclude_bots).await })
    }
}
