use crate::cache::{PredictionCache, PredictionKey};
use crate::catalog::ScenarioCatalog;
use crate::fallback::FallbackPropagation;
use crate::propagation::PropagationEngine;
use futures::stream::{self, StreamExt};
use impactgraph_core::{
    AnalyzerConfig, ChangeScenario, ChangeType, ComparisonThresholds, ImpactAnalysis, ImpactError,
    ImpactPrediction, Result, RiskAssessment, ScoreBonuses, Symbol, SymbolKind, SymbolRef,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// One pairwise delta between two scenarios, j relative to i.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub first_id: String,
    pub second_id: String,
    pub risk_difference: f64,
    pub time_difference_minutes: f64,
    pub complexity_difference: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalPath {
    pub scenario_id: String,
    pub score: f64,
    pub prerequisites: Vec<String>,
    pub mitigations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub scenarios: Vec<ChangeScenario>,
    pub comparisons: Vec<ScenarioComparison>,
    pub optimal: OptimalPath,
}

/// Per-scenario inputs to classification and scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioMetrics {
    pub risk: f64,
    pub total_fix_minutes: f64,
    pub complexity: f64,
}

impl ScenarioMetrics {
    pub fn from_prediction(prediction: &ImpactPrediction) -> Self {
        let stages: HashSet<&str> = prediction
            .affected_nodes
            .iter()
            .filter(|n| !n.symbol.stage.is_empty())
            .map(|n| n.symbol.stage.as_str())
            .collect();
        let mean_severity = if prediction.affected_nodes.is_empty() {
            0.0
        } else {
            prediction
                .affected_nodes
                .iter()
                .map(|n| n.impact_severity)
                .sum::<f64>()
                / prediction.affected_nodes.len() as f64
        };
        Self {
            risk: prediction.risk.overall,
            total_fix_minutes: prediction.total_fix_minutes() as f64,
            complexity: stages.len() as f64 + mean_severity + prediction.max_hop_distance() as f64,
        }
    }
}

/// Evaluates competing what-if scenarios concurrently and ranks them.
///
/// Every scenario runs through the cached prediction pipeline under its
/// own time box. A timed-out or store-failed scenario degrades to a
/// clearly-marked zero-risk prediction instead of aborting the batch;
/// caller errors (unknown symbol, malformed scenario) surface immediately.
pub struct ScenarioComparator {
    engine: Arc<PropagationEngine>,
    fallback: Arc<FallbackPropagation>,
    cache: Arc<PredictionCache>,
    thresholds: ComparisonThresholds,
    bonuses: ScoreBonuses,
    analysis_timeout: Duration,
    max_concurrency: usize,
}

impl ScenarioComparator {
    pub fn new(
        engine: Arc<PropagationEngine>,
        fallback: Arc<FallbackPropagation>,
        cache: Arc<PredictionCache>,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            engine,
            fallback,
            cache,
            thresholds: config.thresholds.clone(),
            bonuses: config.bonuses.clone(),
            analysis_timeout: config.analysis_timeout,
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub async fn compare(&self, scenarios: Vec<ChangeScenario>) -> Result<ComparisonResult> {
        ScenarioCatalog::validate(&scenarios)?;

        let outcomes: Vec<Result<Arc<ImpactPrediction>>> = stream::iter(scenarios.iter())
            .map(|scenario| self.evaluate(scenario))
            .buffered(self.max_concurrency)
            .collect()
            .await;
        let predictions: Vec<Arc<ImpactPrediction>> =
            outcomes.into_iter().collect::<Result<_>>()?;

        let metrics: Vec<ScenarioMetrics> = predictions
            .iter()
            .map(|p| ScenarioMetrics::from_prediction(p))
            .collect();

        let mut comparisons = Vec::new();
        for i in 0..scenarios.len() {
            for j in (i + 1)..scenarios.len() {
                let risk_difference = metrics[j].risk - metrics[i].risk;
                let time_difference = metrics[j].total_fix_minutes - metrics[i].total_fix_minutes;
                let complexity_difference = metrics[j].complexity - metrics[i].complexity;
                comparisons.push(ScenarioComparison {
                    first_id: scenarios[i].id.clone(),
                    second_id: scenarios[j].id.clone(),
                    risk_difference,
                    time_difference_minutes: time_difference,
                    complexity_difference,
                    recommendation: classify(
                        &self.thresholds,
                        risk_difference,
                        time_difference,
                        complexity_difference,
                    ),
                });
            }
        }

        let scores: Vec<f64> = scenarios
            .iter()
            .zip(&metrics)
            .map(|(scenario, m)| {
                raw_score(m)
                    + self.bonuses.business(scenario.business_impact)
                    + self.bonuses.timeframe(scenario.timeframe)
            })
            .collect();
        let best = select_optimal(&scenarios, &metrics, &scores);

        info!(
            optimal = %scenarios[best].id,
            score = scores[best],
            scenarios = scenarios.len(),
            "scenario comparison complete"
        );

        let optimal = OptimalPath {
            scenario_id: scenarios[best].id.clone(),
            score: scores[best],
            prerequisites: prerequisites(&scenarios[best], &predictions[best]),
            mitigations: predictions[best].recommendations.clone(),
        };

        Ok(ComparisonResult {
            scenarios,
            comparisons,
            optimal,
        })
    }

    /// Cached, time-boxed prediction. Shared with the analyzer facade.
    pub async fn predict_cached(
        &self,
        target: &SymbolRef,
        change_type: ChangeType,
        simulated_change: Option<&str>,
    ) -> Result<Arc<ImpactPrediction>> {
        let root = self.engine.resolve(target).await?;
        let key = PredictionKey::new(root.id, change_type, simulated_change);
        let engine = Arc::clone(&self.engine);
        let budget = self.analysis_timeout;
        let target_by_id = SymbolRef::Id(root.id);
        let simulated_owned = simulated_change.map(str::to_string);

        let outcome = self
            .cache
            .get_or_compute(key, || async move {
                match timeout(
                    budget,
                    engine.predict_impact(&target_by_id, change_type, simulated_owned.as_deref()),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ImpactError::AnalysisTimeout(budget.as_millis() as u64)),
                }
            })
            .await;

        match outcome {
            Ok(prediction) => Ok(prediction),
            Err(ImpactError::AnalysisTimeout(ms)) => {
                warn!(
                    symbol = %root.qualified_name,
                    budget_ms = ms,
                    "analysis timed out; degrading to the fallback scan"
                );
                let analysis = self.fallback.basic_impact(&SymbolRef::Id(root.id)).await;
                Ok(Arc::new(timeout_prediction(
                    root,
                    change_type,
                    simulated_change,
                    &analysis,
                    ms,
                )))
            }
            Err(e) => Err(e),
        }
    }

    async fn evaluate(&self, scenario: &ChangeScenario) -> Result<Arc<ImpactPrediction>> {
        match self
            .predict_cached(
                &scenario.target,
                scenario.change_type,
                scenario.simulated_change.as_deref(),
            )
            .await
        {
            Ok(prediction) => Ok(prediction),
            Err(ImpactError::GraphUnavailable(reason)) => {
                warn!(
                    scenario = %scenario.id,
                    %reason,
                    "graph unavailable; scenario degraded to zero risk"
                );
                Ok(Arc::new(unavailable_prediction(scenario, &reason)))
            }
            Err(e) => Err(e),
        }
    }
}

fn classify(
    thresholds: &ComparisonThresholds,
    risk_difference: f64,
    time_difference: f64,
    complexity_difference: f64,
) -> String {
    if risk_difference.abs() > thresholds.risk {
        if risk_difference > 0.0 {
            "second scenario has significantly higher risk".to_string()
        } else {
            "second scenario has significantly lower risk".to_string()
        }
    } else if time_difference.abs() > thresholds.time_minutes {
        if time_difference > 0.0 {
            "second scenario needs significantly more remediation time".to_string()
        } else {
            "second scenario needs significantly less remediation time".to_string()
        }
    } else if complexity_difference.abs() > thresholds.complexity {
        if complexity_difference > 0.0 {
            "second scenario touches a significantly more complex region".to_string()
        } else {
            "second scenario touches a significantly less complex region".to_string()
        }
    } else {
        "similar impact profiles".to_string()
    }
}

fn raw_score(metrics: &ScenarioMetrics) -> f64 {
    (10.0 - metrics.risk) + (1000.0 - metrics.total_fix_minutes) / 100.0 + (20.0 - metrics.complexity)
}

/// Highest score wins; exact ties prefer the lower-risk scenario, then the
/// lexicographically smaller id.
fn select_optimal(
    scenarios: &[ChangeScenario],
    metrics: &[ScenarioMetrics],
    scores: &[f64],
) -> usize {
    let mut best = 0;
    for i in 1..scenarios.len() {
        match scores[i].total_cmp(&scores[best]) {
            Ordering::Greater => best = i,
            Ordering::Equal => match metrics[i].risk.total_cmp(&metrics[best].risk) {
                Ordering::Less => best = i,
                Ordering::Equal if scenarios[i].id < scenarios[best].id => best = i,
                _ => {}
            },
            Ordering::Less => {}
        }
    }
    best
}

fn prerequisites(scenario: &ChangeScenario, prediction: &ImpactPrediction) -> Vec<String> {
    let mut out: Vec<String> = match scenario.change_type {
        ChangeType::Removal => vec![
            "Publish a deprecation notice before deleting the symbol".to_string(),
            "Migrate every dependent to the replacement API".to_string(),
        ],
        ChangeType::Signature => {
            vec!["Update every dependent call site in the same change set".to_string()]
        }
        ChangeType::Dependency => {
            vec!["Stage the new dependency behind an adapter so both paths coexist".to_string()]
        }
        ChangeType::Type => vec![
            "Verify serialized representations of the old and new shape stay compatible"
                .to_string(),
        ],
        ChangeType::Value => {
            vec!["Audit downstream assumptions about the previous value".to_string()]
        }
    };
    if prediction.risk.breaking_changes > 0 {
        out.push(format!(
            "Coordinate migration of {} breaking dependent(s)",
            prediction.risk.breaking_changes
        ));
    }
    out
}

fn timeout_prediction(
    root: Symbol,
    change_type: ChangeType,
    simulated_change: Option<&str>,
    analysis: &ImpactAnalysis,
    budget_ms: u64,
) -> ImpactPrediction {
    ImpactPrediction {
        changed_symbol: root,
        change_type,
        simulated_change: simulated_change.map(str::to_string),
        affected_nodes: Vec::new(),
        risk: RiskAssessment::default(),
        recommendations: vec![
            format!(
                "Analysis exceeded its {} ms budget; results come from the depth-capped fallback scan.",
                budget_ms
            ),
            format!(
                "Fallback scan found {} direct and {} indirect dependents (ripple severity {}/100).",
                analysis.direct.len(),
                analysis.indirect.len(),
                analysis.severity_score
            ),
        ],
        degraded: true,
    }
}

fn unavailable_prediction(scenario: &ChangeScenario, reason: &str) -> ImpactPrediction {
    let placeholder = Symbol::new(
        scenario.target.to_string(),
        SymbolKind::Other("unresolved".to_string()),
    )
    .with_confidence(0.0);
    ImpactPrediction {
        changed_symbol: placeholder,
        change_type: scenario.change_type,
        simulated_change: scenario.simulated_change.clone(),
        affected_nodes: Vec::new(),
        risk: RiskAssessment::default(),
        recommendations: vec![format!(
            "Graph store unavailable while evaluating this scenario ({}); risk reported as zero.",
            reason
        )],
        degraded: true,
    }
}
