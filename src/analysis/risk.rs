use crate::models::RiskCategory;

/// Bucket a trader into a risk category from its win rate (0–100) and
/// profit factor.
///
/// Rules are checked top to bottom; the first match wins:
/// - win_rate ≥ 60 and profit_factor ≥ 2.0 → low
/// - win_rate ≥ 45 and profit_factor ≥ 1.5 → medium
/// - win_rate ≥ 35 → medium-high
/// - otherwise → high
///
/// Ordering matters: a 61% win rate with a weak profit factor falls through
/// the first two rules and lands on medium-high.
pub fn classify_risk(win_rate: f64, profit_factor: f64) -> RiskCategory {
    if win_rate >= 60.0 && profit_factor >= 2.0 {
        RiskCategory::Low
    } else if win_rate >= 45.0 && profit_factor >= 1.5 {
        RiskCategory::Medium
    } else if win_rate >= 35.0 {
        RiskCategory::MediumHigh
    } else {
        RiskCategory::High
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
