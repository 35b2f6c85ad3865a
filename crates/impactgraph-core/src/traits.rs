use crate::{Relationship, Result, Symbol, SymbolId};
use async_trait::async_trait;

/// Read-only query boundary to the symbol/relationship datastore.
///
/// `Ok(None)` and empty vectors mean the symbol or edges do not exist;
/// `Err(GraphUnavailable)` means the store itself failed. Callers rely on
/// the distinction: an empty result is indistinguishable from "no impact",
/// so store failures must never be silently mapped to it.
#[async_trait]
pub trait GraphAccessor: Send + Sync {
    async fn get_symbol(&self, id: SymbolId) -> Result<Option<Symbol>>;

    async fn get_symbol_by_name(&self, name: &str) -> Result<Option<Symbol>>;

    /// Edges pointing at `id`, i.e. "who depends on this symbol".
    async fn incoming_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>>;

    async fn outgoing_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>>;

    /// Symbols on the `from` end of incoming edges, deduplicated.
    async fn dependent_symbols(&self, id: SymbolId) -> Result<Vec<Symbol>>;
}
