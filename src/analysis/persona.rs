use crate::analysis::features::MIN_TRADERS_FOR_CLASSIFICATION;
use crate::models::{EngineeredTrader, PersonaLabel, UNCLASSIFIED};

/// Classification adapter boundary. Implementations take an engineered table
/// (at least [`MIN_TRADERS_FOR_CLASSIFICATION`] rows) and return one persona
/// label per row, in input order. Must be deterministic for a given seed.
pub trait PersonaClassifier: Send + Sync {
    fn classify(&self, traders: &[EngineeredTrader]) -> anyhow::Result<Vec<PersonaLabel>>;
}

/// Production classifier: first-match domain rules over the engineered
/// features, one of six persona archetypes or `Unclassified`.
pub struct DomainRuleClassifier {
    /// Carried for reproducibility parity with the clustering stage; the
    /// domain rules themselves are fully deterministic.
    random_state: u64,
}

impl DomainRuleClassifier {
    pub fn new(random_state: u64) -> Self {
        Self { random_state }
    }
}

impl PersonaClassifier for DomainRuleClassifier {
    fn classify(&self, traders: &[EngineeredTrader]) -> anyhow::Result<Vec<PersonaLabel>> {
        anyhow::ensure!(
            traders.len() >= MIN_TRADERS_FOR_CLASSIFICATION,
            "classifier requires at least {MIN_TRADERS_FOR_CLASSIFICATION} traders, got {}",
            traders.len()
        );

        tracing::info!(
            traders = traders.len(),
            random_state = self.random_state,
            "Running domain-rule classification"
        );

        Ok(traders.iter().map(label_one).collect())
    }
}

fn label_one(t: &EngineeredTrader) -> PersonaLabel {
    let persona = assign_persona(t);
    let quality_score = quality_score(t);

    let persona_confidence = if persona == UNCLASSIFIED {
        0.0
    } else {
        // Confidence tracks quality but never drops below the rule floor.
        (0.5 + 0.5 * quality_score).clamp(0.0, 1.0)
    };

    PersonaLabel {
        persona: persona.to_string(),
        quality_score,
        persona_confidence,
    }
}

/// First matching rule wins, most specific archetype first.
fn assign_persona(t: &EngineeredTrader) -> &'static str {
    if t.win_rate >= 65.0 && t.profit_factor >= 2.5 && t.total_trades >= 20 {
        "Elite Sniper"
    } else if t.total_volume >= 250_000.0 && t.avg_trade_size >= 5_000.0 {
        "Whale"
    } else if t.total_trades >= 200 && t.avg_trade_size < 1_000.0 {
        "Scalper"
    } else if t.roi >= 50.0 && t.win_rate >= 40.0 {
        "Momentum Trader"
    } else if t.win_rate >= 50.0 && t.profit_factor >= 1.2 && t.total_trades >= 30 {
        "Consistent Performer"
    } else if t.loss_rate >= 55.0 && t.total_volume >= 10_000.0 {
        "Risk-Taker"
    } else {
        UNCLASSIFIED
    }
}

/// Weighted composite in [0, 1]. Components are individually clamped so the
/// weights always sum against the same range.
fn quality_score(t: &EngineeredTrader) -> f64 {
    let win_rate = (t.win_rate / 100.0).clamp(0.0, 1.0);
    let profit_factor = (t.profit_factor / 3.0).clamp(0.0, 1.0);
    let activity = (t.total_trades as f64 / 100.0).clamp(0.0, 1.0);
    let profitability = (t.realized_pnl / 10_000.0).clamp(0.0, 1.0);

    let score =
        0.35 * win_rate + 0.25 * profit_factor + 0.20 * activity + 0.20 * profitability;
    score.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
