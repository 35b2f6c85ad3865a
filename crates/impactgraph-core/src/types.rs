use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type SymbolId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Interface,
    Variable,
    Constant,
    Module,
    Other(String),
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Interface => "interface",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Module => "module",
            SymbolKind::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "function" => Ok(SymbolKind::Function),
            "method" => Ok(SymbolKind::Method),
            "class" => Ok(SymbolKind::Class),
            "struct" => Ok(SymbolKind::Struct),
            "enum" => Ok(SymbolKind::Enum),
            "interface" => Ok(SymbolKind::Interface),
            "variable" => Ok(SymbolKind::Variable),
            "constant" => Ok(SymbolKind::Constant),
            "module" => Ok(SymbolKind::Module),
            other => Ok(SymbolKind::Other(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    Calls,
    Uses,
    Inherits,
    Includes,
    Instantiates,
    Overrides,
    Notifies,
    Other(String),
}

impl Default for RelationshipType {
    fn default() -> Self {
        RelationshipType::Uses
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationshipType::Calls => "calls",
            RelationshipType::Uses => "uses",
            RelationshipType::Inherits => "inherits",
            RelationshipType::Includes => "includes",
            RelationshipType::Instantiates => "instantiates",
            RelationshipType::Overrides => "overrides",
            RelationshipType::Notifies => "notifies",
            RelationshipType::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calls" => Ok(RelationshipType::Calls),
            "uses" => Ok(RelationshipType::Uses),
            "inherits" => Ok(RelationshipType::Inherits),
            "includes" => Ok(RelationshipType::Includes),
            "instantiates" => Ok(RelationshipType::Instantiates),
            "overrides" => Ok(RelationshipType::Overrides),
            "notifies" => Ok(RelationshipType::Notifies),
            other => Ok(RelationshipType::Other(other.to_string())),
        }
    }
}

/// Directed edge between two symbols. Direction is caller to callee, so
/// the dependents of a symbol are the `from` ends of its incoming edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: SymbolId,
    pub to: SymbolId,
    pub rel_type: RelationshipType,
    pub confidence: f64,
}

impl Relationship {
    pub fn new(from: SymbolId, to: SymbolId, rel_type: RelationshipType) -> Self {
        Self {
            from,
            to,
            rel_type,
            confidence: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Either end of the public API accepts a symbol by id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolRef {
    Id(SymbolId),
    Name(String),
}

impl SymbolRef {
    pub fn is_blank(&self) -> bool {
        matches!(self, SymbolRef::Name(n) if n.trim().is_empty())
    }
}

impl From<SymbolId> for SymbolRef {
    fn from(id: SymbolId) -> Self {
        SymbolRef::Id(id)
    }
}

impl From<&str> for SymbolRef {
    fn from(name: &str) -> Self {
        SymbolRef::Name(name.to_string())
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolRef::Id(id) => write!(f, "{}", id),
            SymbolRef::Name(name) => f.write_str(name),
        }
    }
}

/// Kind of change being simulated. Base severities descend in the order
/// removal, signature, dependency, type, value (see `PropagationConfig`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    Type,
    Value,
    Signature,
    Dependency,
    Removal,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Type => "type",
            ChangeType::Value => "value",
            ChangeType::Signature => "signature",
            ChangeType::Dependency => "dependency",
            ChangeType::Removal => "removal",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "type" => Ok(ChangeType::Type),
            "value" => Ok(ChangeType::Value),
            "signature" => Ok(ChangeType::Signature),
            "dependency" => Ok(ChangeType::Dependency),
            "removal" => Ok(ChangeType::Removal),
            other => Err(format!("unknown change type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_type_round_trips_through_display() {
        for rel in [
            RelationshipType::Calls,
            RelationshipType::Inherits,
            RelationshipType::Notifies,
        ] {
            let parsed: RelationshipType = rel.to_string().parse().unwrap();
            assert_eq!(parsed, rel);
        }
    }

    #[test]
    fn unknown_relationship_type_maps_to_other() {
        let parsed: RelationshipType = "annotates".parse().unwrap();
        assert_eq!(parsed, RelationshipType::Other("annotates".to_string()));
    }

    #[test]
    fn change_type_rejects_unknown_input() {
        assert!("rename".parse::<ChangeType>().is_err());
        assert_eq!("removal".parse::<ChangeType>().unwrap(), ChangeType::Removal);
    }

    #[test]
    fn blank_symbol_ref_is_detected() {
        assert!(SymbolRef::Name("  ".into()).is_blank());
        assert!(!SymbolRef::Id(Uuid::new_v4()).is_blank());
    }
}
