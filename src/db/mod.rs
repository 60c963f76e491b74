pub mod trader_repo;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

pub use trader_repo::SqlTraderSource;

pub async fn init_pool(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}
