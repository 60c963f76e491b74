use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Constant tag attached to every classified record; all personas in this
/// system come from the domain-rule classifier.
pub const CLASSIFICATION_METHOD: &str = "domain_rules";

/// Persona label for wallets no rule matched.
pub const UNCLASSIFIED: &str = "Unclassified";

/// One row of the `traders` table, storage-layer column names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RawTrader {
    pub wallet_address: String,
    pub gross_profit: f64,
    pub realized_profit: f64,
    pub realized_profit_percent: f64,
    pub win_rate: f64,
    pub wins: i64,
    pub losses: i64,
    pub trade_volume: f64,
    pub trades: i64,
    pub avg_trade_size: f64,
    pub is_bot: bool,
}

/// Raw trader after feature engineering. Field names here are the analysis
/// vocabulary (`total_pnl`, `roi`, ...) that every downstream consumer keys on,
/// not the storage column names.
///
/// Invariant: after [`crate::analysis::features::engineer`] no float field is
/// NaN or infinite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineeredTrader {
    pub address: String,
    pub total_pnl: f64,
    pub realized_pnl: f64,
    pub roi: f64,
    pub win_rate: f64,
    pub wins: i64,
    pub losses: i64,
    pub total_volume: f64,
    pub total_trades: i64,
    pub avg_trade_size: f64,
    pub profit_factor: f64,
    pub loss_rate: f64,
    pub avg_profit: f64,
}

impl EngineeredTrader {
    /// Replace every non-finite float field with 0. Runs as the final
    /// engineering step so no NaN/infinity can leak downstream, whatever
    /// the raw inputs were.
    pub fn sanitize(&mut self) {
        for v in [
            &mut self.total_pnl,
            &mut self.realized_pnl,
            &mut self.roi,
            &mut self.win_rate,
            &mut self.total_volume,
            &mut self.avg_trade_size,
            &mut self.profit_factor,
            &mut self.loss_rate,
            &mut self.avg_profit,
        ] {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
    }
}

/// Persona assignment produced by the classification adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaLabel {
    pub persona: String,
    /// 0–1 quality metric.
    pub quality_score: f64,
    /// 0–1 confidence in the persona assignment.
    pub persona_confidence: f64,
}

/// Final analysis output row: engineered features plus persona, scores and
/// risk category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedTrader {
    #[serde(flatten)]
    pub features: EngineeredTrader,
    pub persona: String,
    pub quality_score: f64,
    pub persona_confidence: f64,
    /// `quality_score` scaled to 0–100.
    pub copy_trading_score: f64,
    pub risk_category: RiskCategory,
    pub classification_method: String,
}

impl ClassifiedTrader {
    pub fn is_classified(&self) -> bool {
        self.persona != UNCLASSIFIED
    }
}

// ---------------------------------------------------------------------------
// RiskCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "medium-high")]
    MediumHigh,
    #[serde(rename = "high")]
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::MediumHigh => "medium-high",
            RiskCategory::High => "high",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
