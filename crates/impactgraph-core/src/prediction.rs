use crate::{ChangeType, Symbol, SymbolId};
use serde::{Deserialize, Serialize};

/// One symbol reached by impact propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedNode {
    pub symbol: Symbol,
    /// Shortest dependency chain from the changed symbol to this one,
    /// both endpoints included; hop distance = len - 1 >= 1.
    pub propagation_path: Vec<SymbolId>,
    /// Decayed impact severity on the 0-10 scale.
    pub impact_severity: f64,
    pub estimated_fix_minutes: u32,
}

impl AffectedNode {
    pub fn hop_distance(&self) -> usize {
        self.propagation_path.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RiskAssessment {
    /// Aggregate risk on the 0-10 scale.
    pub overall: f64,
    /// Nodes whose severity crosses the breaking threshold.
    pub breaking_changes: usize,
    /// Sorted distinct architectural stages touched.
    pub testing_required: Vec<String>,
    /// Sorted distinct namespace owners of affected symbols.
    pub reviewers_needed: Vec<String>,
}

/// Immutable result of one prediction pipeline run. A new change request
/// produces a new prediction, never an in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactPrediction {
    pub changed_symbol: Symbol,
    pub change_type: ChangeType,
    pub simulated_change: Option<String>,
    pub affected_nodes: Vec<AffectedNode>,
    pub risk: RiskAssessment,
    pub recommendations: Vec<String>,
    /// True when this result came from a fallback or error path and
    /// carries less information than a full propagation run.
    pub degraded: bool,
}

impl ImpactPrediction {
    pub fn total_fix_minutes(&self) -> u64 {
        self.affected_nodes
            .iter()
            .map(|n| n.estimated_fix_minutes as u64)
            .sum()
    }

    pub fn max_hop_distance(&self) -> usize {
        self.affected_nodes
            .iter()
            .map(|n| n.hop_distance())
            .max()
            .unwrap_or(0)
    }
}

/// Dependents sharing the same hop distance from the changed symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RippleWave {
    pub distance: usize,
    pub symbols: Vec<Symbol>,
}

/// Reduced impact shape produced by the fallback path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImpactAnalysis {
    pub direct: Vec<Symbol>,
    pub indirect: Vec<Symbol>,
    pub ripple_waves: Vec<RippleWave>,
    /// Coarse severity score capped at 100.
    pub severity_score: u32,
}

impl ImpactAnalysis {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.indirect.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolKind;
    use uuid::Uuid;

    #[test]
    fn hop_distance_counts_edges_not_nodes() {
        let node = AffectedNode {
            symbol: Symbol::new("f", SymbolKind::Function),
            propagation_path: vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            impact_severity: 4.0,
            estimated_fix_minutes: 30,
        };
        assert_eq!(node.hop_distance(), 2);
    }

    #[test]
    fn empty_analysis_reports_empty() {
        assert!(ImpactAnalysis::empty().is_empty());
        assert_eq!(ImpactAnalysis::empty().severity_score, 0);
    }
}
