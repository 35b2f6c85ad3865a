use crate::{BusinessImpact, ChangeType, SymbolKind, Timeframe};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the breadth-first impact traversal and the severity law
/// `base(change_type) * decay^(hop-1) * confidence_factor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Hop distance beyond which a branch is never expanded.
    pub max_depth: usize,
    /// Severity below which a node is neither recorded nor expanded.
    pub min_severity: f64,
    /// Per-hop severity multiplier, in (0, 1).
    pub decay_factor: f64,
    /// Lower bound applied to symbol confidence before it discounts severity.
    pub confidence_floor: f64,
    pub removal_severity: f64,
    pub signature_severity: f64,
    pub dependency_severity: f64,
    pub type_severity: f64,
    pub value_severity: f64,
    pub fix_time: FixTimeConfig,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_severity: 0.5,
            decay_factor: 0.6,
            confidence_floor: 0.25,
            removal_severity: 9.5,
            signature_severity: 8.0,
            dependency_severity: 6.5,
            type_severity: 5.0,
            value_severity: 3.0,
            fix_time: FixTimeConfig::default(),
        }
    }
}

impl PropagationConfig {
    pub fn base_severity(&self, change_type: ChangeType) -> f64 {
        match change_type {
            ChangeType::Removal => self.removal_severity,
            ChangeType::Signature => self.signature_severity,
            ChangeType::Dependency => self.dependency_severity,
            ChangeType::Type => self.type_severity,
            ChangeType::Value => self.value_severity,
        }
    }

    pub fn confidence_factor(&self, confidence: f64) -> f64 {
        confidence.clamp(self.confidence_floor, 1.0)
    }
}

/// Remediation-time lookup keyed by symbol kind and severity band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixTimeConfig {
    pub function_minutes: u32,
    pub method_minutes: u32,
    pub class_minutes: u32,
    pub struct_minutes: u32,
    pub enum_minutes: u32,
    pub interface_minutes: u32,
    pub variable_minutes: u32,
    pub constant_minutes: u32,
    pub module_minutes: u32,
    pub other_minutes: u32,
    /// Severity band upper bounds.
    pub low_band_max: f64,
    pub moderate_band_max: f64,
    pub high_band_max: f64,
    /// Multipliers per band; a trivial rename lands around 15 minutes,
    /// a critical interface change at several hours.
    pub low_band_factor: f64,
    pub moderate_band_factor: f64,
    pub high_band_factor: f64,
    pub critical_band_factor: f64,
}

impl Default for FixTimeConfig {
    fn default() -> Self {
        Self {
            function_minutes: 30,
            method_minutes: 30,
            class_minutes: 60,
            struct_minutes: 45,
            enum_minutes: 20,
            interface_minutes: 75,
            variable_minutes: 10,
            constant_minutes: 10,
            module_minutes: 90,
            other_minutes: 30,
            low_band_max: 4.0,
            moderate_band_max: 7.0,
            high_band_max: 9.0,
            low_band_factor: 0.5,
            moderate_band_factor: 1.0,
            high_band_factor: 2.0,
            critical_band_factor: 4.0,
        }
    }
}

impl FixTimeConfig {
    pub fn base_minutes(&self, kind: &SymbolKind) -> u32 {
        match kind {
            SymbolKind::Function => self.function_minutes,
            SymbolKind::Method => self.method_minutes,
            SymbolKind::Class => self.class_minutes,
            SymbolKind::Struct => self.struct_minutes,
            SymbolKind::Enum => self.enum_minutes,
            SymbolKind::Interface => self.interface_minutes,
            SymbolKind::Variable => self.variable_minutes,
            SymbolKind::Constant => self.constant_minutes,
            SymbolKind::Module => self.module_minutes,
            SymbolKind::Other(_) => self.other_minutes,
        }
    }

    pub fn band_factor(&self, severity: f64) -> f64 {
        if severity < self.low_band_max {
            self.low_band_factor
        } else if severity < self.moderate_band_max {
            self.moderate_band_factor
        } else if severity < self.high_band_max {
            self.high_band_factor
        } else {
            self.critical_band_factor
        }
    }

    pub fn estimate(&self, kind: &SymbolKind, severity: f64) -> u32 {
        (self.base_minutes(kind) as f64 * self.band_factor(severity)).round() as u32
    }
}

/// Weights for reducing an affected-node set to a single 0-10 risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Severity at or above which a node counts as a breaking change.
    pub breaking_threshold: f64,
    pub max_severity_weight: f64,
    pub breaking_weight: f64,
    pub breaking_cap: usize,
    pub breadth_weight: f64,
    pub breadth_cap: usize,
    pub volume_weight: f64,
    pub volume_cap: usize,
    /// Band edges used by the recommendation text.
    pub critical_band: f64,
    pub high_band: f64,
    pub moderate_band: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            breaking_threshold: 7.0,
            max_severity_weight: 0.6,
            breaking_weight: 0.8,
            breaking_cap: 5,
            breadth_weight: 0.5,
            breadth_cap: 4,
            volume_weight: 0.1,
            volume_cap: 20,
            critical_band: 8.0,
            high_band: 6.0,
            moderate_band: 3.0,
        }
    }
}

/// Fixed classification thresholds for pairwise scenario comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonThresholds {
    pub risk: f64,
    pub time_minutes: f64,
    pub complexity: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        Self {
            risk: 2.0,
            time_minutes: 120.0,
            complexity: 3.0,
        }
    }
}

/// Additive bonuses applied on top of the raw scenario score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBonuses {
    pub critical_impact: f64,
    pub high_impact: f64,
    pub medium_impact: f64,
    pub low_impact: f64,
    pub immediate: f64,
    pub short_term: f64,
    pub medium_term: f64,
    pub long_term: f64,
}

impl Default for ScoreBonuses {
    fn default() -> Self {
        Self {
            critical_impact: 5.0,
            high_impact: 3.0,
            medium_impact: 1.0,
            low_impact: -1.0,
            immediate: 4.0,
            short_term: 2.0,
            medium_term: 0.0,
            long_term: -2.0,
        }
    }
}

impl ScoreBonuses {
    pub fn business(&self, impact: BusinessImpact) -> f64 {
        match impact {
            BusinessImpact::Critical => self.critical_impact,
            BusinessImpact::High => self.high_impact,
            BusinessImpact::Medium => self.medium_impact,
            BusinessImpact::Low => self.low_impact,
        }
    }

    pub fn timeframe(&self, timeframe: Timeframe) -> f64 {
        match timeframe {
            Timeframe::Immediate => self.immediate,
            Timeframe::ShortTerm => self.short_term,
            Timeframe::MediumTerm => self.medium_term,
            Timeframe::LongTerm => self.long_term,
        }
    }
}

/// Bounds for the prediction cache. Entries are never invalidated
/// automatically unless a TTL is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            ttl: None,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub propagation: PropagationConfig,
    pub risk: RiskConfig,
    pub thresholds: ComparisonThresholds,
    pub bonuses: ScoreBonuses,
    pub cache: CacheConfig,
    /// Time box for one prediction; an expired analysis degrades to the
    /// fallback path instead of failing the caller.
    pub analysis_timeout: Duration,
    /// Upper bound on concurrently evaluated scenarios.
    pub max_concurrency: usize,
    /// Depth cap for the fallback ripple scan.
    pub fallback_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            propagation: PropagationConfig::default(),
            risk: RiskConfig::default(),
            thresholds: ComparisonThresholds::default(),
            bonuses: ScoreBonuses::default(),
            cache: CacheConfig::default(),
            analysis_timeout: Duration::from_millis(800),
            max_concurrency: num_cpus::get().clamp(2, 8),
            fallback_depth: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_severity_ordering_matches_change_kinds() {
        let cfg = PropagationConfig::default();
        assert!(cfg.base_severity(ChangeType::Removal) > cfg.base_severity(ChangeType::Signature));
        assert!(
            cfg.base_severity(ChangeType::Signature) > cfg.base_severity(ChangeType::Dependency)
        );
        assert!(cfg.base_severity(ChangeType::Dependency) > cfg.base_severity(ChangeType::Type));
        assert!(cfg.base_severity(ChangeType::Type) > cfg.base_severity(ChangeType::Value));
    }

    #[test]
    fn trivial_rename_estimates_fifteen_minutes() {
        let fix = FixTimeConfig::default();
        assert_eq!(fix.estimate(&SymbolKind::Function, 2.0), 15);
    }

    #[test]
    fn critical_interface_change_estimates_hours() {
        let fix = FixTimeConfig::default();
        assert!(fix.estimate(&SymbolKind::Interface, 9.5) >= 240);
    }

    #[test]
    fn confidence_factor_applies_floor() {
        let cfg = PropagationConfig::default();
        assert_eq!(cfg.confidence_factor(0.05), cfg.confidence_floor);
        assert_eq!(cfg.confidence_factor(0.9), 0.9);
    }
}
