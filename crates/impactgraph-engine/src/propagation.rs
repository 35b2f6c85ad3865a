use crate::risk::RiskAggregator;
use impactgraph_core::{
    AffectedNode, ChangeType, GraphAccessor, ImpactError, ImpactPrediction, PropagationConfig,
    Result, RiskConfig, Symbol, SymbolId, SymbolRef,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// Multi-hop impact propagation over the dependent graph.
///
/// Traversal is breadth-first so every recorded propagation path is a
/// shortest dependency chain, and a visited set keeps cyclic relationship
/// graphs from looping. Severity follows
/// `base(change_type) * decay^(hop-1) * confidence_factor`, clamped to
/// [0, 10]; a branch stops expanding once severity drops below the
/// configured minimum or the hop distance exceeds the depth cap.
pub struct PropagationEngine {
    graph: Arc<dyn GraphAccessor>,
    config: PropagationConfig,
    aggregator: RiskAggregator,
}

impl PropagationEngine {
    pub fn new(graph: Arc<dyn GraphAccessor>, config: PropagationConfig, risk: RiskConfig) -> Self {
        Self {
            graph,
            config,
            aggregator: RiskAggregator::new(risk),
        }
    }

    /// Resolve a symbol reference against the store.
    pub async fn resolve(&self, target: &SymbolRef) -> Result<Symbol> {
        let found = match target {
            SymbolRef::Id(id) => self.graph.get_symbol(*id).await?,
            SymbolRef::Name(name) => self.graph.get_symbol_by_name(name).await?,
        };
        found.ok_or_else(|| ImpactError::SymbolNotFound(target.to_string()))
    }

    pub async fn predict_impact(
        &self,
        target: &SymbolRef,
        change_type: ChangeType,
        simulated_change: Option<&str>,
    ) -> Result<ImpactPrediction> {
        let root = self.resolve(target).await?;
        let affected = self.propagate(&root, change_type).await?;
        let risk = self.aggregator.assess(&affected);
        let mut recommendations = self.aggregator.recommend(&affected, &risk);
        if let Some(change) = simulated_change {
            recommendations.push(format!(
                "Validate the simulated change ({}) against the listed dependents before committing.",
                change
            ));
        }

        info!(
            symbol = %root.qualified_name,
            change = %change_type,
            affected = affected.len(),
            risk = risk.overall,
            "impact prediction complete"
        );

        Ok(ImpactPrediction {
            changed_symbol: root,
            change_type,
            simulated_change: simulated_change.map(str::to_string),
            affected_nodes: affected,
            risk,
            recommendations,
            degraded: false,
        })
    }

    async fn propagate(&self, root: &Symbol, change_type: ChangeType) -> Result<Vec<AffectedNode>> {
        let base = self.config.base_severity(change_type);
        let mut affected = Vec::new();
        let mut visited: HashSet<SymbolId> = HashSet::new();
        visited.insert(root.id);

        // Queue entries carry the full path from the root; the path length
        // is the hop distance of the entry's children.
        let mut queue: VecDeque<(SymbolId, Vec<SymbolId>)> = VecDeque::new();
        queue.push_back((root.id, vec![root.id]));

        while let Some((current, path)) = queue.pop_front() {
            let hop = path.len();
            if hop > self.config.max_depth {
                continue;
            }

            let mut dependents = self.graph.dependent_symbols(current).await?;
            dependents.sort_by_key(|s| s.id);

            for dependent in dependents {
                if !visited.insert(dependent.id) {
                    continue;
                }

                let severity = (base
                    * self.config.decay_factor.powi(hop as i32 - 1)
                    * self.config.confidence_factor(dependent.confidence))
                .clamp(0.0, 10.0);
                if severity < self.config.min_severity {
                    continue;
                }

                let mut dependent_path = path.clone();
                dependent_path.push(dependent.id);
                let fix_minutes = self.config.fix_time.estimate(&dependent.kind, severity);

                debug!(
                    symbol = %dependent.qualified_name,
                    hop,
                    severity,
                    "dependent reached"
                );

                queue.push_back((dependent.id, dependent_path.clone()));
                affected.push(AffectedNode {
                    symbol: dependent,
                    propagation_path: dependent_path,
                    impact_severity: severity,
                    estimated_fix_minutes: fix_minutes,
                });
            }
        }

        Ok(affected)
    }
}
