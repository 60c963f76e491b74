use metrics::counter;

use crate::errors::AnalysisError;
use crate::models::{EngineeredTrader, RawTrader};

/// Minimum number of non-bot traders required before classification is
/// considered meaningful.
pub const MIN_TRADERS_FOR_CLASSIFICATION: usize = 10;

/// Build the engineered feature set from raw storage rows.
///
/// Steps, in order:
/// 1. Drop bot accounts.
/// 2. Fail with `InsufficientData` when fewer than
///    [`MIN_TRADERS_FOR_CLASSIFICATION`] traders remain.
/// 3. Rename storage columns into the analysis vocabulary and derive
///    `profit_factor`, `loss_rate` and `avg_profit`.
/// 4. Final sanitation pass: every non-finite float becomes 0.
pub fn engineer(raw: Vec<RawTrader>) -> Result<Vec<EngineeredTrader>, AnalysisError> {
    let original_count = raw.len();
    tracing::info!(traders = original_count, "Preparing trader features");

    let survivors: Vec<RawTrader> = raw.into_iter().filter(|t| !t.is_bot).collect();
    let bots_dropped = original_count - survivors.len();
    if bots_dropped > 0 {
        counter!("bots_filtered_total").increment(bots_dropped as u64);
        tracing::info!(
            bots_dropped,
            remaining = survivors.len(),
            "Filtered bot accounts"
        );
    }

    if survivors.len() < MIN_TRADERS_FOR_CLASSIFICATION {
        return Err(AnalysisError::insufficient(survivors.len()));
    }

    let engineered: Vec<EngineeredTrader> = survivors.into_iter().map(engineer_one).collect();

    tracing::info!(traders = engineered.len(), "Feature preparation complete");
    Ok(engineered)
}

fn engineer_one(t: RawTrader) -> EngineeredTrader {
    // Guarded divisions: wins/losses and pnl/trades fall back rather than
    // dividing by zero. A wallet with zero losses keeps profit_factor = wins.
    let profit_factor = if t.losses > 0 {
        t.wins as f64 / t.losses as f64
    } else {
        t.wins as f64
    };

    let avg_profit = if t.trades > 0 {
        t.realized_profit / t.trades as f64
    } else {
        0.0
    };

    let mut out = EngineeredTrader {
        address: t.wallet_address,
        total_pnl: t.gross_profit,
        realized_pnl: t.realized_profit,
        roi: t.realized_profit_percent,
        win_rate: t.win_rate,
        wins: t.wins,
        losses: t.losses,
        total_volume: t.trade_volume,
        total_trades: t.trades,
        avg_trade_size: t.avg_trade_size,
        profit_factor,
        loss_rate: 100.0 - t.win_rate,
        avg_profit,
    };

    // Unconditional: raw columns can carry NaN/inf from upstream ETL.
    out.sanitize();
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
