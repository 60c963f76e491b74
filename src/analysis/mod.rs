pub mod cache;
pub mod features;
pub mod persona;
pub mod risk;

pub use cache::{AnalysisCache, CacheSnapshot, TraderSource};
pub use persona::{DomainRuleClassifier, PersonaClassifier};
pub use risk::classify_risk;
