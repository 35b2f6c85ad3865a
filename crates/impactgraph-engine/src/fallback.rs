use impactgraph_core::{
    GraphAccessor, ImpactAnalysis, RelationshipType, Result, RippleWave, Symbol, SymbolId,
    SymbolRef,
};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Depth-capped ripple scan used when the full propagation pipeline fails
/// or runs out of time. Intentionally cruder than `PropagationEngine`: no
/// decay law, no fix-time estimates, a single 0-100 score.
///
/// Never errors: unresolvable symbols and mid-scan store failures degrade
/// to an empty analysis.
pub struct FallbackPropagation {
    graph: Arc<dyn GraphAccessor>,
    max_depth: usize,
}

impl FallbackPropagation {
    pub fn new(graph: Arc<dyn GraphAccessor>, max_depth: usize) -> Self {
        Self { graph, max_depth }
    }

    pub async fn basic_impact(&self, target: &SymbolRef) -> ImpactAnalysis {
        match self.scan(target).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(symbol = %target, error = %e, "fallback scan degraded to empty analysis");
                ImpactAnalysis::empty()
            }
        }
    }

    async fn scan(&self, target: &SymbolRef) -> Result<ImpactAnalysis> {
        let root = match target {
            SymbolRef::Id(id) => self.graph.get_symbol(*id).await?,
            SymbolRef::Name(name) => self.graph.get_symbol_by_name(name).await?,
        };
        let root = match root {
            Some(symbol) => symbol,
            None => return Ok(ImpactAnalysis::empty()),
        };

        let mut visited: HashSet<SymbolId> = HashSet::new();
        visited.insert(root.id);
        let mut waves: BTreeMap<usize, Vec<Symbol>> = BTreeMap::new();
        let mut severity: u32 = 0;

        let mut queue: VecDeque<(SymbolId, usize)> = VecDeque::new();
        queue.push_back((root.id, 0));

        while let Some((current, distance)) = queue.pop_front() {
            if distance >= self.max_depth {
                continue;
            }

            let mut edges = self.graph.incoming_relationships(current).await?;
            edges.sort_by_key(|e| e.from);

            for edge in edges {
                if !visited.insert(edge.from) {
                    continue;
                }
                let dependent = match self.graph.get_symbol(edge.from).await? {
                    Some(symbol) => symbol,
                    None => continue,
                };

                let breaking = Self::is_breaking(&edge.rel_type);
                let points = match (distance == 0, breaking) {
                    (true, true) => 10,
                    (true, false) => 5,
                    (false, true) => 3,
                    (false, false) => 1,
                };
                severity = (severity + points).min(100);

                waves.entry(distance + 1).or_default().push(dependent);
                queue.push_back((edge.from, distance + 1));
            }
        }

        let direct = waves.get(&1).cloned().unwrap_or_default();
        let indirect: Vec<Symbol> = waves
            .range(2..)
            .flat_map(|(_, symbols)| symbols.iter().cloned())
            .collect();
        let ripple_waves: Vec<RippleWave> = waves
            .into_iter()
            .map(|(distance, symbols)| RippleWave { distance, symbols })
            .collect();

        Ok(ImpactAnalysis {
            direct,
            indirect,
            ripple_waves,
            severity_score: severity,
        })
    }

    fn is_breaking(rel_type: &RelationshipType) -> bool {
        matches!(
            rel_type,
            RelationshipType::Calls | RelationshipType::Inherits | RelationshipType::Overrides
        )
    }
}
