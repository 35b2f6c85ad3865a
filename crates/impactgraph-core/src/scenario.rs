use crate::{ChangeType, SymbolRef};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessImpact {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for BusinessImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BusinessImpact::Low => "low",
            BusinessImpact::Medium => "medium",
            BusinessImpact::High => "high",
            BusinessImpact::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Immediate => "immediate",
            Timeframe::ShortTerm => "short-term",
            Timeframe::MediumTerm => "medium-term",
            Timeframe::LongTerm => "long-term",
        };
        write!(f, "{}", s)
    }
}

/// A named, hypothetical change used to compare implementation strategies
/// before committing to one. Immutable; `id` is the caching identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target: SymbolRef,
    pub change_type: ChangeType,
    pub simulated_change: Option<String>,
    /// Subjective likelihood in [0, 1]. Informational only.
    pub probability: f64,
    pub business_impact: BusinessImpact,
    pub timeframe: Timeframe,
}

impl ChangeScenario {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target: SymbolRef,
        change_type: ChangeType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            target,
            change_type,
            simulated_change: None,
            probability: 0.5,
            business_impact: BusinessImpact::Medium,
            timeframe: Timeframe::MediumTerm,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_simulated_change(mut self, change: impl Into<String>) -> Self {
        self.simulated_change = Some(change.into());
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn with_business_impact(mut self, impact: BusinessImpact) -> Self {
        self.business_impact = impact;
        self
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }
}
