use impactgraph_core::{
    BusinessImpact, ChangeScenario, ChangeType, ImpactError, Result, Symbol, SymbolKind, SymbolRef,
    Timeframe,
};
use std::collections::HashSet;

/// Generates plausible default scenarios for a symbol based on its kind.
/// Pure template data; the comparison pipeline treats catalog output and
/// caller-supplied scenarios identically.
pub struct ScenarioCatalog;

impl ScenarioCatalog {
    pub fn default_scenarios(symbol: &Symbol) -> Vec<ChangeScenario> {
        let target = SymbolRef::Id(symbol.id);
        let slug = symbol.name.to_lowercase();

        match symbol.kind {
            SymbolKind::Function | SymbolKind::Method => vec![
                ChangeScenario::new(
                    format!("{}-signature", slug),
                    format!("Widen the signature of {}", symbol.name),
                    target.clone(),
                    ChangeType::Signature,
                )
                .with_description("Add a parameter or change a parameter type in place.")
                .with_simulated_change("extend parameter list with an optional argument")
                .with_probability(0.6)
                .with_business_impact(BusinessImpact::Medium)
                .with_timeframe(Timeframe::ShortTerm),
                ChangeScenario::new(
                    format!("{}-deprecate", slug),
                    format!("Deprecate and remove {}", symbol.name),
                    target,
                    ChangeType::Removal,
                )
                .with_description("Retire the callable after a deprecation window.")
                .with_probability(0.3)
                .with_business_impact(BusinessImpact::High)
                .with_timeframe(Timeframe::LongTerm),
            ],
            SymbolKind::Class | SymbolKind::Struct | SymbolKind::Enum => vec![
                ChangeScenario::new(
                    format!("{}-type", slug),
                    format!("Reshape the fields of {}", symbol.name),
                    target.clone(),
                    ChangeType::Type,
                )
                .with_description("Change the data layout or field types.")
                .with_probability(0.5)
                .with_business_impact(BusinessImpact::Medium)
                .with_timeframe(Timeframe::MediumTerm),
                ChangeScenario::new(
                    format!("{}-dependency", slug),
                    format!("Swap a dependency of {}", symbol.name),
                    target,
                    ChangeType::Dependency,
                )
                .with_description("Replace a collaborator the type constructs or holds.")
                .with_probability(0.4)
                .with_business_impact(BusinessImpact::Medium)
                .with_timeframe(Timeframe::ShortTerm),
            ],
            SymbolKind::Interface => vec![
                ChangeScenario::new(
                    format!("{}-signature", slug),
                    format!("Extend the contract of {}", symbol.name),
                    target.clone(),
                    ChangeType::Signature,
                )
                .with_description("Add or reshape a method every implementor must provide.")
                .with_probability(0.5)
                .with_business_impact(BusinessImpact::High)
                .with_timeframe(Timeframe::MediumTerm),
                ChangeScenario::new(
                    format!("{}-removal", slug),
                    format!("Retire {}", symbol.name),
                    target,
                    ChangeType::Removal,
                )
                .with_description("Collapse the abstraction into its sole implementor.")
                .with_probability(0.2)
                .with_business_impact(BusinessImpact::High)
                .with_timeframe(Timeframe::LongTerm),
            ],
            SymbolKind::Variable | SymbolKind::Constant => vec![ChangeScenario::new(
                format!("{}-value", slug),
                format!("Change the value of {}", symbol.name),
                target,
                ChangeType::Value,
            )
            .with_description("Adjust the assigned value without touching the type.")
            .with_probability(0.7)
            .with_business_impact(BusinessImpact::Low)
            .with_timeframe(Timeframe::Immediate)],
            SymbolKind::Module | SymbolKind::Other(_) => vec![
                ChangeScenario::new(
                    format!("{}-dependency", slug),
                    format!("Refactor the dependencies of {}", symbol.name),
                    target.clone(),
                    ChangeType::Dependency,
                )
                .with_description("Rewire what the module imports and re-exports.")
                .with_probability(0.5)
                .with_business_impact(BusinessImpact::Medium)
                .with_timeframe(Timeframe::MediumTerm),
                ChangeScenario::new(
                    format!("{}-removal", slug),
                    format!("Dissolve {}", symbol.name),
                    target,
                    ChangeType::Removal,
                )
                .with_description("Fold the module's contents into its consumers.")
                .with_probability(0.2)
                .with_business_impact(BusinessImpact::High)
                .with_timeframe(Timeframe::LongTerm),
            ],
        }
    }

    /// Reject malformed scenario sets before any evaluation starts.
    pub fn validate(scenarios: &[ChangeScenario]) -> Result<()> {
        if scenarios.is_empty() {
            return Err(ImpactError::InvalidScenario(
                "scenario list is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for scenario in scenarios {
            if scenario.id.trim().is_empty() {
                return Err(ImpactError::InvalidScenario(format!(
                    "scenario '{}' has a blank id",
                    scenario.name
                )));
            }
            if !seen.insert(scenario.id.as_str()) {
                return Err(ImpactError::InvalidScenario(format!(
                    "duplicate scenario id '{}'",
                    scenario.id
                )));
            }
            if scenario.target.is_blank() {
                return Err(ImpactError::InvalidScenario(format!(
                    "scenario '{}' has no target symbol",
                    scenario.id
                )));
            }
            if !(0.0..=1.0).contains(&scenario.probability) {
                return Err(ImpactError::InvalidScenario(format!(
                    "scenario '{}' probability {} is outside [0, 1]",
                    scenario.id, scenario.probability
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callables_get_signature_and_removal_scenarios() {
        let symbol = Symbol::new("render", SymbolKind::Function);
        let scenarios = ScenarioCatalog::default_scenarios(&symbol);
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].change_type, ChangeType::Signature);
        assert_eq!(scenarios[1].change_type, ChangeType::Removal);
        ScenarioCatalog::validate(&scenarios).unwrap();
    }

    #[test]
    fn constants_get_a_value_scenario() {
        let symbol = Symbol::new("MAX_RETRIES", SymbolKind::Constant);
        let scenarios = ScenarioCatalog::default_scenarios(&symbol);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].change_type, ChangeType::Value);
        assert_eq!(scenarios[0].timeframe, Timeframe::Immediate);
    }

    #[test]
    fn catalog_ids_are_unique_per_symbol() {
        let symbol = Symbol::new("Mesh", SymbolKind::Struct);
        let scenarios = ScenarioCatalog::default_scenarios(&symbol);
        let ids: HashSet<&str> = scenarios.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), scenarios.len());
    }

    #[test]
    fn validation_rejects_empty_blank_and_duplicate() {
        assert!(matches!(
            ScenarioCatalog::validate(&[]),
            Err(ImpactError::InvalidScenario(_))
        ));

        let symbol = Symbol::new("f", SymbolKind::Function);
        let mut scenarios = ScenarioCatalog::default_scenarios(&symbol);
        scenarios[1].id = scenarios[0].id.clone();
        assert!(matches!(
            ScenarioCatalog::validate(&scenarios),
            Err(ImpactError::InvalidScenario(_))
        ));

        let blank_target = vec![ChangeScenario::new(
            "x",
            "blank",
            SymbolRef::Name("  ".into()),
            ChangeType::Type,
        )];
        assert!(matches!(
            ScenarioCatalog::validate(&blank_target),
            Err(ImpactError::InvalidScenario(_))
        ));

        let bad_probability = vec![ChangeScenario::new(
            "y",
            "likely",
            SymbolRef::Name("f".into()),
            ChangeType::Type,
        )
        .with_probability(1.4)];
        assert!(matches!(
            ScenarioCatalog::validate(&bad_probability),
            Err(ImpactError::InvalidScenario(_))
        ));
    }
}
