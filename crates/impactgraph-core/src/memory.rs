use crate::{GraphAccessor, Relationship, Result, Symbol, SymbolId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process `GraphAccessor` backed by adjacency maps. Used by tests and
/// by embedders that index straight into memory.
///
/// Dependent lists are returned sorted by symbol id so traversal order,
/// and with it every propagation path, is deterministic.
#[derive(Default)]
pub struct MemoryGraph {
    symbols: RwLock<HashMap<SymbolId, Symbol>>,
    by_name: RwLock<HashMap<String, SymbolId>>,
    /// to_symbol -> edges pointing at it (edges in)
    incoming: RwLock<HashMap<SymbolId, Vec<Relationship>>>,
    /// from_symbol -> edges leaving it (edges out)
    outgoing: RwLock<HashMap<SymbolId, Vec<Relationship>>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a symbol. Both the short and the qualified name
    /// are indexed for lookup.
    pub fn insert_symbol(&self, symbol: Symbol) {
        let mut names = self.by_name.write();
        names.insert(symbol.name.clone(), symbol.id);
        if symbol.qualified_name != symbol.name {
            names.insert(symbol.qualified_name.clone(), symbol.id);
        }
        self.symbols.write().insert(symbol.id, symbol);
    }

    pub fn insert_relationship(&self, rel: Relationship) {
        self.incoming
            .write()
            .entry(rel.to)
            .or_default()
            .push(rel.clone());
        self.outgoing.write().entry(rel.from).or_default().push(rel);
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.read().len()
    }
}

#[async_trait]
impl GraphAccessor for MemoryGraph {
    async fn get_symbol(&self, id: SymbolId) -> Result<Option<Symbol>> {
        Ok(self.symbols.read().get(&id).cloned())
    }

    async fn get_symbol_by_name(&self, name: &str) -> Result<Option<Symbol>> {
        let id = match self.by_name.read().get(name) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.symbols.read().get(&id).cloned())
    }

    async fn incoming_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>> {
        Ok(self.incoming.read().get(&id).cloned().unwrap_or_default())
    }

    async fn outgoing_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>> {
        Ok(self.outgoing.read().get(&id).cloned().unwrap_or_default())
    }

    async fn dependent_symbols(&self, id: SymbolId) -> Result<Vec<Symbol>> {
        let mut ids: Vec<SymbolId> = self
            .incoming
            .read()
            .get(&id)
            .map(|edges| edges.iter().map(|e| e.from).collect())
            .unwrap_or_default();
        ids.sort();
        ids.dedup();

        let symbols = self.symbols.read();
        Ok(ids.iter().filter_map(|i| symbols.get(i).cloned()).collect())
    }
}
