use crate::{SymbolId, SymbolKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A code symbol as served by the graph store. Read-only to this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    /// Architectural layer tag, e.g. "api", "domain", "storage".
    pub stage: String,
    /// Parser certainty in [0, 1].
    pub confidence: f64,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            qualified_name: name.clone(),
            name,
            kind,
            stage: String::new(),
            confidence: 1.0,
        }
    }

    pub fn with_qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = qualified_name.into();
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Namespace prefix of the qualified name, used as an ownership hint.
    /// `geometry::mesh::subdivide` owns to `geometry::mesh`.
    pub fn namespace(&self) -> Option<&str> {
        self.qualified_name
            .rfind("::")
            .map(|idx| &self.qualified_name[..idx])
            .filter(|ns| !ns.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_strips_last_segment() {
        let sym = Symbol::new("subdivide", SymbolKind::Function)
            .with_qualified_name("geometry::mesh::subdivide");
        assert_eq!(sym.namespace(), Some("geometry::mesh"));
    }

    #[test]
    fn namespace_is_none_for_top_level_symbols() {
        let sym = Symbol::new("main", SymbolKind::Function);
        assert_eq!(sym.namespace(), None);
    }

    #[test]
    fn confidence_is_clamped() {
        let sym = Symbol::new("x", SymbolKind::Variable).with_confidence(1.7);
        assert_eq!(sym.confidence, 1.0);
    }
}
