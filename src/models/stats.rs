use serde::{Deserialize, Serialize};

/// Aggregate statistics over the `traders` table (non-bot rows for the
/// averages and sums).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_traders: i64,
    pub non_bot_traders: i64,
    pub bot_traders: i64,
    pub avg_win_rate: f64,
    pub avg_trades: f64,
    pub avg_volume: f64,
    pub avg_profit: f64,
    pub total_profit: f64,
    pub total_volume: f64,
}
