use impactgraph_core::{AffectedNode, RiskAssessment, RiskConfig};
use std::collections::BTreeSet;

/// Reduces an affected-node set to a single risk assessment plus
/// human-readable guidance.
///
/// The overall score is a weighted combination of the maximum severity,
/// the breaking-change count, the breadth of stages touched and the raw
/// node count, each capped so one catastrophic node and a wide spread of
/// moderate nodes both land in the high band while a single low-severity
/// dependent does not.
pub struct RiskAggregator {
    config: RiskConfig,
}

impl RiskAggregator {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn assess(&self, nodes: &[AffectedNode]) -> RiskAssessment {
        if nodes.is_empty() {
            return RiskAssessment::default();
        }

        let max_severity = nodes
            .iter()
            .map(|n| n.impact_severity)
            .fold(0.0_f64, f64::max);
        let breaking = nodes
            .iter()
            .filter(|n| n.impact_severity >= self.config.breaking_threshold)
            .count();
        let stages: BTreeSet<String> = nodes
            .iter()
            .filter(|n| !n.symbol.stage.is_empty())
            .map(|n| n.symbol.stage.clone())
            .collect();
        let owners: BTreeSet<String> = nodes
            .iter()
            .filter_map(|n| n.symbol.namespace().map(str::to_string))
            .collect();

        let overall = (self.config.max_severity_weight * max_severity
            + self.config.breaking_weight * breaking.min(self.config.breaking_cap) as f64
            + self.config.breadth_weight * stages.len().min(self.config.breadth_cap) as f64
            + self.config.volume_weight * nodes.len().min(self.config.volume_cap) as f64)
            .clamp(0.0, 10.0);

        RiskAssessment {
            overall,
            breaking_changes: breaking,
            testing_required: stages.into_iter().collect(),
            reviewers_needed: owners.into_iter().collect(),
        }
    }

    pub fn recommend(&self, nodes: &[AffectedNode], risk: &RiskAssessment) -> Vec<String> {
        if nodes.is_empty() {
            return vec![
                "No dependent symbols are affected; the change can land in isolation.".to_string(),
            ];
        }

        let mut out = Vec::new();
        if risk.overall >= self.config.critical_band {
            out.push(
                "Critical risk: gate the rollout behind a feature flag and coordinate with every affected team before merging."
                    .to_string(),
            );
        } else if risk.overall >= self.config.high_band {
            out.push(
                "High risk: coordinate with the owners of the affected modules and stage the change."
                    .to_string(),
            );
        } else if risk.overall >= self.config.moderate_band {
            out.push(
                "Moderate risk: review the affected call sites and extend tests where coverage is thin."
                    .to_string(),
            );
        } else {
            out.push("Low risk: routine review is sufficient.".to_string());
        }

        if risk.breaking_changes > 0 {
            out.push(format!(
                "{} dependent symbol(s) cross the breaking-change threshold; plan their migration in the same change set.",
                risk.breaking_changes
            ));
        }
        if risk.testing_required.len() > 2 {
            out.push(format!(
                "Impact spans {} architectural stages; run the full integration suite rather than targeted tests.",
                risk.testing_required.len()
            ));
        }
        if !risk.reviewers_needed.is_empty() {
            out.push(format!(
                "Request review from the owners of: {}.",
                risk.reviewers_needed.join(", ")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impactgraph_core::{Symbol, SymbolKind};
    use uuid::Uuid;

    fn node(qualified: &str, stage: &str, severity: f64) -> AffectedNode {
        AffectedNode {
            symbol: Symbol::new("n", SymbolKind::Function)
                .with_qualified_name(qualified)
                .with_stage(stage),
            propagation_path: vec![Uuid::new_v4(), Uuid::new_v4()],
            impact_severity: severity,
            estimated_fix_minutes: 30,
        }
    }

    fn aggregator() -> RiskAggregator {
        RiskAggregator::new(RiskConfig::default())
    }

    #[test]
    fn empty_set_scores_zero() {
        let risk = aggregator().assess(&[]);
        assert_eq!(risk.overall, 0.0);
        assert_eq!(risk.breaking_changes, 0);
        assert!(risk.testing_required.is_empty());
    }

    #[test]
    fn breaking_count_matches_threshold_exactly() {
        let nodes = vec![
            node("a::x", "api", 7.0),
            node("a::y", "api", 6.99),
            node("b::z", "domain", 9.0),
        ];
        let risk = aggregator().assess(&nodes);
        assert_eq!(risk.breaking_changes, 2);
    }

    #[test]
    fn one_catastrophic_node_lands_in_the_high_band() {
        let cfg = RiskConfig::default();
        let risk = aggregator().assess(&[node("core::hub", "core", 9.5)]);
        assert!(risk.overall >= cfg.high_band);
    }

    #[test]
    fn many_moderate_nodes_land_in_the_high_band() {
        let stages = ["api", "domain", "storage", "ui"];
        let nodes: Vec<AffectedNode> = (0..16)
            .map(|i| node(&format!("m{}::f", i), stages[i % stages.len()], 6.0))
            .collect();
        let cfg = RiskConfig::default();
        let risk = aggregator().assess(&nodes);
        assert!(risk.overall >= cfg.high_band);
        assert_eq!(risk.breaking_changes, 0);
    }

    #[test]
    fn a_single_small_node_stays_low() {
        let cfg = RiskConfig::default();
        let risk = aggregator().assess(&[node("util::pad", "util", 3.0)]);
        assert!(risk.overall < cfg.moderate_band);
    }

    #[test]
    fn stages_and_owners_are_sorted_and_distinct() {
        let nodes = vec![
            node("beta::f", "storage", 5.0),
            node("alpha::g", "api", 5.0),
            node("alpha::h", "api", 5.0),
        ];
        let risk = aggregator().assess(&nodes);
        assert_eq!(risk.testing_required, vec!["api", "storage"]);
        assert_eq!(risk.reviewers_needed, vec!["alpha", "beta"]);
    }

    #[test]
    fn recommendations_scale_with_risk_band() {
        let agg = aggregator();

        let calm = vec![node("util::pad", "util", 3.0)];
        let calm_risk = agg.assess(&calm);
        let calm_rec = agg.recommend(&calm, &calm_risk);
        assert!(calm_rec[0].starts_with("Low risk"));

        let hot: Vec<AffectedNode> = (0..8)
            .map(|i| node(&format!("core::f{}", i), "core", 9.0))
            .collect();
        let hot_risk = agg.assess(&hot);
        let hot_rec = agg.recommend(&hot, &hot_risk);
        assert!(hot_rec[0].starts_with("Critical risk"));
        assert!(hot_rec.iter().any(|r| r.contains("breaking-change threshold")));
    }

    #[test]
    fn empty_set_recommends_isolation() {
        let agg = aggregator();
        let risk = agg.assess(&[]);
        let rec = agg.recommend(&[], &risk);
        assert_eq!(rec.len(), 1);
        assert!(rec[0].contains("land in isolation"));
    }
}
