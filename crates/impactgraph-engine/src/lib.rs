pub mod analyzer;
pub mod cache;
pub mod catalog;
pub mod compare;
pub mod fallback;
pub mod propagation;
pub mod risk;

pub use analyzer::ImpactAnalyzer;
pub use cache::{CacheStats, PredictionCache, PredictionKey};
pub use catalog::ScenarioCatalog;
pub use compare::{ComparisonResult, OptimalPath, ScenarioComparator, ScenarioComparison};
pub use fallback::FallbackPropagation;
pub use propagation::PropagationEngine;
pub use risk::RiskAggregator;
