use crate::cache::{CacheStats, PredictionCache, PredictionKey};
use crate::catalog::ScenarioCatalog;
use crate::compare::{ComparisonResult, ScenarioComparator};
use crate::fallback::FallbackPropagation;
use crate::propagation::PropagationEngine;
use impactgraph_core::{
    AnalyzerConfig, ChangeScenario, ChangeType, GraphAccessor, ImpactAnalysis, ImpactPrediction,
    Result, SymbolRef,
};
use std::sync::Arc;

/// Composition root and public surface of the engine.
///
/// Owns one prediction cache for its lifetime; callers that need a fresh
/// view of a changed graph use `invalidate_prediction` or a new analyzer.
pub struct ImpactAnalyzer {
    engine: Arc<PropagationEngine>,
    fallback: Arc<FallbackPropagation>,
    cache: Arc<PredictionCache>,
    comparator: ScenarioComparator,
}

impl ImpactAnalyzer {
    pub fn new(graph: Arc<dyn GraphAccessor>) -> Self {
        Self::with_config(graph, AnalyzerConfig::default())
    }

    pub fn with_config(graph: Arc<dyn GraphAccessor>, config: AnalyzerConfig) -> Self {
        let engine = Arc::new(PropagationEngine::new(
            Arc::clone(&graph),
            config.propagation.clone(),
            config.risk.clone(),
        ));
        let fallback = Arc::new(FallbackPropagation::new(graph, config.fallback_depth));
        let cache = Arc::new(PredictionCache::new(config.cache.clone()));
        let comparator = ScenarioComparator::new(
            Arc::clone(&engine),
            Arc::clone(&fallback),
            Arc::clone(&cache),
            &config,
        );
        Self {
            engine,
            fallback,
            cache,
            comparator,
        }
    }

    /// Predict the impact of one change. Cached and time-boxed; a timed-out
    /// analysis returns an uncached, clearly-marked fallback result.
    /// Unknown symbols and store failures surface as errors.
    pub async fn predict_impact(
        &self,
        target: &SymbolRef,
        change_type: ChangeType,
        simulated_change: Option<&str>,
    ) -> Result<Arc<ImpactPrediction>> {
        self.comparator
            .predict_cached(target, change_type, simulated_change)
            .await
    }

    /// Evaluate and rank scenarios. With `None`, plausible defaults are
    /// generated from the target symbol's kind.
    pub async fn analyze_scenarios(
        &self,
        target: &SymbolRef,
        scenarios: Option<Vec<ChangeScenario>>,
    ) -> Result<ComparisonResult> {
        let scenarios = match scenarios {
            Some(scenarios) => scenarios,
            None => {
                let symbol = self.engine.resolve(target).await?;
                ScenarioCatalog::default_scenarios(&symbol)
            }
        };
        self.comparator.compare(scenarios).await
    }

    /// Depth-capped ripple scan; succeeds for any input.
    pub async fn basic_impact(&self, target: &SymbolRef) -> ImpactAnalysis {
        self.fallback.basic_impact(target).await
    }

    /// Drop one cached prediction so the next request recomputes against
    /// the current graph.
    pub async fn invalidate_prediction(
        &self,
        target: &SymbolRef,
        change_type: ChangeType,
        simulated_change: Option<&str>,
    ) -> Result<()> {
        let symbol = self.engine.resolve(target).await?;
        self.cache
            .invalidate(&PredictionKey::new(symbol.id, change_type, simulated_change));
        Ok(())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
