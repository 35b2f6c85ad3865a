use async_trait::async_trait;
use impactgraph_engine::ImpactAnalyzer;
use impactgraph_core::{
    AnalyzerConfig, BusinessImpact, ChangeScenario, ChangeType, GraphAccessor, ImpactError,
    MemoryGraph, Relationship, RelationshipType, Result, Symbol, SymbolId, SymbolKind, SymbolRef,
    Timeframe,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn symbol(name: &str, qualified: &str, stage: &str) -> Symbol {
    Symbol::new(name, SymbolKind::Function)
        .with_qualified_name(qualified)
        .with_stage(stage)
}

/// Foo::bar <- Baz::qux <- Qux::quux
fn chain_graph() -> (Arc<MemoryGraph>, Symbol, Symbol, Symbol) {
    let graph = Arc::new(MemoryGraph::new());
    let bar = symbol("bar", "Foo::bar", "domain");
    let qux = symbol("qux", "Baz::qux", "api");
    let quux = symbol("quux", "Qux::quux", "ui");
    for s in [&bar, &qux, &quux] {
        graph.insert_symbol(s.clone());
    }
    graph.insert_relationship(Relationship::new(qux.id, bar.id, RelationshipType::Calls));
    graph.insert_relationship(Relationship::new(quux.id, qux.id, RelationshipType::Calls));
    (graph, bar, qux, quux)
}

/// Wraps a graph and counts traversal queries to observe cache behavior.
struct CountingGraph {
    inner: Arc<MemoryGraph>,
    dependent_queries: AtomicUsize,
}

#[async_trait]
impl GraphAccessor for CountingGraph {
    async fn get_symbol(&self, id: SymbolId) -> Result<Option<Symbol>> {
        self.inner.get_symbol(id).await
    }

    async fn get_symbol_by_name(&self, name: &str) -> Result<Option<Symbol>> {
        self.inner.get_symbol_by_name(name).await
    }

    async fn incoming_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>> {
        self.inner.incoming_relationships(id).await
    }

    async fn outgoing_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>> {
        self.inner.outgoing_relationships(id).await
    }

    async fn dependent_symbols(&self, id: SymbolId) -> Result<Vec<Symbol>> {
        self.dependent_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.dependent_symbols(id).await
    }
}

/// A store that fails every query.
struct DownGraph;

#[async_trait]
impl GraphAccessor for DownGraph {
    async fn get_symbol(&self, _id: SymbolId) -> Result<Option<Symbol>> {
        Err(ImpactError::GraphUnavailable("connection refused".into()))
    }

    async fn get_symbol_by_name(&self, _name: &str) -> Result<Option<Symbol>> {
        Err(ImpactError::GraphUnavailable("connection refused".into()))
    }

    async fn incoming_relationships(&self, _id: SymbolId) -> Result<Vec<Relationship>> {
        Err(ImpactError::GraphUnavailable("connection refused".into()))
    }

    async fn outgoing_relationships(&self, _id: SymbolId) -> Result<Vec<Relationship>> {
        Err(ImpactError::GraphUnavailable("connection refused".into()))
    }

    async fn dependent_symbols(&self, _id: SymbolId) -> Result<Vec<Symbol>> {
        Err(ImpactError::GraphUnavailable("connection refused".into()))
    }
}

/// Delegates to a real graph but stalls traversal queries long enough to
/// trip the analysis time box. Lookups stay fast so the fallback path and
/// key resolution still work.
struct StallingGraph {
    inner: Arc<MemoryGraph>,
    stall: Duration,
}

#[async_trait]
impl GraphAccessor for StallingGraph {
    async fn get_symbol(&self, id: SymbolId) -> Result<Option<Symbol>> {
        self.inner.get_symbol(id).await
    }

    async fn get_symbol_by_name(&self, name: &str) -> Result<Option<Symbol>> {
        self.inner.get_symbol_by_name(name).await
    }

    async fn incoming_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>> {
        self.inner.incoming_relationships(id).await
    }

    async fn outgoing_relationships(&self, id: SymbolId) -> Result<Vec<Relationship>> {
        self.inner.outgoing_relationships(id).await
    }

    async fn dependent_symbols(&self, id: SymbolId) -> Result<Vec<Symbol>> {
        tokio::time::sleep(self.stall).await;
        self.inner.dependent_symbols(id).await
    }
}

#[tokio::test]
async fn symbol_without_dependents_predicts_no_impact() {
    let graph = Arc::new(MemoryGraph::new());
    let bar = symbol("bar", "Foo::bar", "domain");
    graph.insert_symbol(bar.clone());

    let analyzer = ImpactAnalyzer::new(graph);
    let prediction = analyzer
        .predict_impact(&SymbolRef::Name("Foo::bar".into()), ChangeType::Signature, None)
        .await
        .unwrap();

    assert!(prediction.affected_nodes.is_empty());
    assert_eq!(prediction.risk.overall, 0.0);
    assert_eq!(prediction.risk.breaking_changes, 0);
}

#[tokio::test]
async fn transitive_chain_produces_ordered_paths_and_monotonic_severity() {
    let (graph, bar, qux, quux) = chain_graph();
    let analyzer = ImpactAnalyzer::new(graph);

    let prediction = analyzer
        .predict_impact(&SymbolRef::Id(bar.id), ChangeType::Signature, None)
        .await
        .unwrap();

    assert_eq!(prediction.affected_nodes.len(), 2);
    let direct = prediction
        .affected_nodes
        .iter()
        .find(|n| n.symbol.id == qux.id)
        .expect("direct dependent present");
    let transitive = prediction
        .affected_nodes
        .iter()
        .find(|n| n.symbol.id == quux.id)
        .expect("transitive dependent present");

    assert!(direct.impact_severity >= transitive.impact_severity);
    assert_eq!(transitive.propagation_path, vec![bar.id, qux.id, quux.id]);

    // no symbol appears twice in one prediction
    let mut ids: Vec<SymbolId> = prediction.affected_nodes.iter().map(|n| n.symbol.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), prediction.affected_nodes.len());

    // breaking count mirrors the severity threshold
    let breaking = prediction
        .affected_nodes
        .iter()
        .filter(|n| n.impact_severity >= 7.0)
        .count();
    assert_eq!(prediction.risk.breaking_changes, breaking);
}

#[tokio::test]
async fn concurrent_identical_predictions_traverse_the_graph_once() {
    let (inner, bar, _, _) = chain_graph();
    let counting = Arc::new(CountingGraph {
        inner,
        dependent_queries: AtomicUsize::new(0),
    });
    let analyzer = Arc::new(ImpactAnalyzer::new(counting.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let analyzer = Arc::clone(&analyzer);
        let target = SymbolRef::Id(bar.id);
        handles.push(tokio::spawn(async move {
            analyzer
                .predict_impact(&target, ChangeType::Signature, None)
                .await
                .unwrap()
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    // One BFS over root, mid and leaf queries dependents three times; a
    // second traversal would double that.
    assert_eq!(counting.dependent_queries.load(Ordering::SeqCst), 3);
    for result in &results {
        assert_eq!(**result, **results.first().unwrap());
    }

    let stats = analyzer.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);
}

#[tokio::test]
async fn scenario_comparison_flags_the_risk_dominant_pair() {
    let graph = Arc::new(MemoryGraph::new());

    // "quiet" has one far-flung dependent; "hub" fans out to many
    // breaking dependents across stages.
    let quiet = symbol("quiet", "calm::quiet", "util");
    let hub = symbol("hub", "core::hub", "core");
    graph.insert_symbol(quiet.clone());
    graph.insert_symbol(hub.clone());

    let listener = symbol("listener", "calm::listener", "util");
    graph.insert_symbol(listener.clone());
    graph.insert_relationship(Relationship::new(
        listener.id,
        quiet.id,
        RelationshipType::Notifies,
    ));

    let stages = ["api", "domain", "storage", "ui"];
    for i in 0..12 {
        let caller = symbol(
            &format!("caller{}", i),
            &format!("svc{}::caller{}", i, i),
            stages[i % stages.len()],
        );
        graph.insert_symbol(caller.clone());
        graph.insert_relationship(Relationship::new(
            caller.id,
            hub.id,
            RelationshipType::Calls,
        ));
    }

    let analyzer = ImpactAnalyzer::new(graph);
    let scenarios = vec![
        ChangeScenario::new("calm-tweak", "Tweak quiet", SymbolRef::Id(quiet.id), ChangeType::Value),
        ChangeScenario::new("hub-removal", "Remove hub", SymbolRef::Id(hub.id), ChangeType::Removal),
    ];

    let result = analyzer
        .analyze_scenarios(&SymbolRef::Id(quiet.id), Some(scenarios))
        .await
        .unwrap();

    let pair = result
        .comparisons
        .iter()
        .find(|c| c.first_id == "calm-tweak" && c.second_id == "hub-removal")
        .unwrap();
    assert!(pair.risk_difference > 2.0);
    assert_eq!(pair.recommendation, "second scenario has significantly higher risk");

    // The calm scenario scores higher and wins.
    assert_eq!(result.optimal.scenario_id, "calm-tweak");
    assert!(!result.optimal.mitigations.is_empty());
}

#[tokio::test]
async fn critical_immediate_bonus_decides_between_equal_predictions() {
    let (graph, bar, _, _) = chain_graph();
    let analyzer = ImpactAnalyzer::new(graph);

    // Same target and change type: identical raw metrics, bonuses differ
    // by (5 + 4) - (1 + 0) = 8 points.
    let steady = ChangeScenario::new(
        "steady-refactor",
        "Steady refactor",
        SymbolRef::Id(bar.id),
        ChangeType::Signature,
    )
    .with_business_impact(BusinessImpact::Medium)
    .with_timeframe(Timeframe::MediumTerm);
    let urgent = ChangeScenario::new(
        "urgent-hotfix",
        "Urgent hotfix",
        SymbolRef::Id(bar.id),
        ChangeType::Signature,
    )
    .with_business_impact(BusinessImpact::Critical)
    .with_timeframe(Timeframe::Immediate);

    let result = analyzer
        .analyze_scenarios(&SymbolRef::Id(bar.id), Some(vec![steady, urgent]))
        .await
        .unwrap();

    assert_eq!(result.optimal.scenario_id, "urgent-hotfix");
}

#[tokio::test]
async fn repeated_comparisons_pick_the_same_optimal_scenario() {
    let (graph, bar, _, _) = chain_graph();
    let analyzer = ImpactAnalyzer::new(graph);

    let scenarios: Vec<ChangeScenario> = [
        ("a-signature", ChangeType::Signature),
        ("b-removal", ChangeType::Removal),
        ("c-value", ChangeType::Value),
    ]
    .into_iter()
    .map(|(id, ct)| ChangeScenario::new(id, id, SymbolRef::Id(bar.id), ct))
    .collect();

    let first = analyzer
        .analyze_scenarios(&SymbolRef::Id(bar.id), Some(scenarios.clone()))
        .await
        .unwrap();
    let second = analyzer
        .analyze_scenarios(&SymbolRef::Id(bar.id), Some(scenarios))
        .await
        .unwrap();

    assert_eq!(first.optimal.scenario_id, second.optimal.scenario_id);
    assert_eq!(first, second);
}

#[tokio::test]
async fn default_scenarios_come_from_the_catalog() {
    let (graph, bar, _, _) = chain_graph();
    let analyzer = ImpactAnalyzer::new(graph);

    let result = analyzer
        .analyze_scenarios(&SymbolRef::Id(bar.id), None)
        .await
        .unwrap();

    // Functions get a signature-change and a deprecation scenario.
    assert_eq!(result.scenarios.len(), 2);
    assert_eq!(result.comparisons.len(), 1);
}

#[tokio::test]
async fn duplicate_scenario_ids_are_rejected_upfront() {
    let (graph, bar, _, _) = chain_graph();
    let analyzer = ImpactAnalyzer::new(graph);

    let scenario =
        ChangeScenario::new("dup", "dup", SymbolRef::Id(bar.id), ChangeType::Signature);
    let err = analyzer
        .analyze_scenarios(&SymbolRef::Id(bar.id), Some(vec![scenario.clone(), scenario]))
        .await
        .unwrap_err();
    assert!(matches!(err, ImpactError::InvalidScenario(_)));
}

#[tokio::test]
async fn missing_symbol_errors_on_predict_but_not_on_basic_impact() {
    let graph = Arc::new(MemoryGraph::new());
    let analyzer = ImpactAnalyzer::new(graph);
    let ghost = SymbolRef::Name("Ghost::walk".into());

    let err = analyzer
        .predict_impact(&ghost, ChangeType::Type, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ImpactError::SymbolNotFound(_)));

    let analysis = analyzer.basic_impact(&ghost).await;
    assert!(analysis.is_empty());
    assert_eq!(analysis.severity_score, 0);
}

#[tokio::test]
async fn store_failure_surfaces_on_single_predictions() {
    let analyzer = ImpactAnalyzer::new(Arc::new(DownGraph));
    let err = analyzer
        .predict_impact(&SymbolRef::Name("any".into()), ChangeType::Type, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ImpactError::GraphUnavailable(_)));
}

#[tokio::test]
async fn store_failure_degrades_scenarios_instead_of_failing_the_batch() {
    let analyzer = ImpactAnalyzer::new(Arc::new(DownGraph));
    let scenarios = vec![
        ChangeScenario::new("one", "one", SymbolRef::Name("a".into()), ChangeType::Type),
        ChangeScenario::new("two", "two", SymbolRef::Name("b".into()), ChangeType::Removal),
    ];

    let result = analyzer
        .analyze_scenarios(&SymbolRef::Name("a".into()), Some(scenarios))
        .await
        .unwrap();

    assert_eq!(result.comparisons.len(), 1);
    assert_eq!(result.comparisons[0].risk_difference, 0.0);
    assert_eq!(result.comparisons[0].recommendation, "similar impact profiles");
    assert!(result
        .optimal
        .mitigations
        .iter()
        .any(|m| m.contains("Graph store unavailable")));
}

#[tokio::test]
async fn slow_traversal_degrades_to_the_fallback_scan() {
    let (inner, bar, _, _) = chain_graph();
    let graph = Arc::new(StallingGraph {
        inner,
        stall: Duration::from_millis(200),
    });

    let mut config = AnalyzerConfig::default();
    config.analysis_timeout = Duration::from_millis(50);
    let analyzer = ImpactAnalyzer::with_config(graph, config);

    let prediction = analyzer
        .predict_impact(&SymbolRef::Id(bar.id), ChangeType::Signature, None)
        .await
        .unwrap();

    assert!(prediction.degraded);
    assert_eq!(prediction.risk.overall, 0.0);
    assert!(prediction
        .recommendations
        .iter()
        .any(|r| r.contains("fallback scan")));

    // Degraded results are not cached: a later request recomputes.
    assert_eq!(analyzer.cache_stats().entries, 0);
}
