pub mod stats;
pub mod trader;

pub use stats::DatabaseStats;
pub use trader::{
    ClassifiedTrader, EngineeredTrader, PersonaLabel, RawTrader, RiskCategory,
    CLASSIFICATION_METHOD, UNCLASSIFIED,
};
