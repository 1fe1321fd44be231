//! Latent introduction tests: block search, the two dependence checks,
//! knowledge, the latent hierarchy, and placement.

use std::sync::Arc;

use pag_core::config::{LatentCheck, LatentConfig};
use pag_core::{
    Cancellable, CancellationToken, Endpoint, Graph, GuardedOracle, Knowledge, Node, PagConfig, SepsetMap,
};
use pag_search::latent::arrange_hierarchy;
use pag_search::{LatentBlock, LatentIntroducer, LatentMap, LatentResult, OrientationEngine, PagPipeline};
use test_fixtures::{load_scenario, ScriptedOracle};

use Endpoint::{Arrow as A, Circle as C, Tail as T};

fn graph(nodes: &[&str], edges: &[(&str, Endpoint, &str, Endpoint)]) -> Graph {
    let mut g = Graph::with_observed(nodes.iter().copied()).unwrap();
    for &(x, mx, y, my) in edges {
        g.add_edge_by_name(x, mx, y, my).unwrap();
    }
    g
}

fn edge(g: &Graph, x: &str, y: &str) -> Option<String> {
    g.edge_by_name(x, y).map(|e| e.to_string())
}

/// `A --> C`, `A --> D`, `B o-> C`, `B o-> D`.
fn two_parent_block() -> Graph {
    graph(
        &["A", "B", "C", "D"],
        &[
            ("A", T, "C", A),
            ("A", T, "D", A),
            ("B", C, "C", A),
            ("B", C, "D", A),
        ],
    )
}

/// C and D separate only given both A and B.
fn two_parent_oracle() -> GuardedOracle {
    let oracle = ScriptedOracle::new(&["A", "B", "C", "D"]).independent("C", "D", &["A", "B"]);
    GuardedOracle::new(Arc::new(oracle))
}

fn introduce(g: &mut Graph, oracle: &GuardedOracle, knowledge: &Knowledge, check: LatentCheck) -> LatentResult {
    let sepsets = SepsetMap::new();
    let engine = OrientationEngine::new(oracle, &sepsets, knowledge);
    LatentIntroducer::new(oracle, &engine)
        .with_config(LatentConfig {
            enabled: true,
            check,
            ..LatentConfig::default()
        })
        .introduce(g)
        .unwrap()
}

fn block(latent: &str, parents: &[&str], children: &[&str]) -> LatentBlock {
    LatentBlock {
        latent: latent.to_string(),
        parents: parents.iter().map(|s| s.to_string()).collect(),
        children: children.iter().map(|s| s.to_string()).collect(),
    }
}

// =============================================================================
// Block search
// =============================================================================

#[test]
fn t01_hidden_common_causes_are_recovered() {
    let scenario = load_scenario("latent_blocks");
    let config = PagConfig::from_toml(&scenario.config).unwrap();
    let output = PagPipeline::new(config)
        .unwrap()
        .run(Arc::new(scenario.dag.oracle()))
        .unwrap();

    let latents = output.latents.expect("latent introduction enabled");
    assert_eq!(latents.latents.len(), 2);
    assert_eq!(latents.latents.latent_for(&["A", "B"]), Some("L1"));
    assert_eq!(latents.latents.latent_for(&["D", "C"]), Some("L2"));

    let l2 = latents.latents.block("L2").unwrap();
    assert_eq!(l2.children, vec!["E", "F"]);
    assert!(latents.hierarchy.is_empty());

    let g = &output.graph;
    assert!(g.is_latent(g.id("L1").unwrap()));
    assert_eq!(edge(g, "A", "L1").as_deref(), Some("A --> L1"));
    assert_eq!(edge(g, "L1", "D").as_deref(), Some("L1 --> D"));
    assert_eq!(edge(g, "A", "C"), None);
    assert_eq!(edge(g, "D", "E"), None);
}

#[test]
fn t02_no_latent_when_the_parent_explains_the_children() {
    let oracle = GuardedOracle::new(Arc::new(
        ScriptedOracle::new(&["A", "C", "D"]).independent("C", "D", &["A"]),
    ));
    let mut g = graph(&["A", "C", "D"], &[("A", C, "C", A), ("A", C, "D", A)]);
    let before = g.clone();
    let result = introduce(&mut g, &oracle, &Knowledge::new(), LatentCheck::Direct);

    assert!(result.latents.is_empty());
    assert_eq!(result.tests_run, 1);
    assert!(g.same_structure(&before));
}

#[test]
fn t03_direct_check_conditions_on_the_whole_block() {
    let oracle = two_parent_oracle();
    let mut g = two_parent_block();
    let result = introduce(&mut g, &oracle, &Knowledge::new(), LatentCheck::Direct);

    assert_eq!(result.latents.len(), 2);
    assert_eq!(result.latents.latent_for(&["A"]), Some("L1"));
    assert_eq!(result.latents.latent_for(&["B"]), Some("L2"));
    assert_eq!(edge(&g, "B", "L2").as_deref(), Some("B --> L2"));
    assert_eq!(edge(&g, "L2", "C").as_deref(), Some("L2 --> C"));
}

#[test]
fn t04_minimal_check_ignores_parents_without_a_definite_tail() {
    let oracle = two_parent_oracle();
    let mut g = two_parent_block();
    let result = introduce(&mut g, &oracle, &Knowledge::new(), LatentCheck::Minimal);

    assert_eq!(result.latents.len(), 1);
    assert_eq!(result.latents.latent_for(&["B", "A"]), Some("L1"));
    assert_eq!(result.latents.blocks()[0].children, vec!["C", "D"]);
    assert_eq!(g.adjacent(g.id("C").unwrap()).len(), 1);
}

#[test]
fn t05_required_edges_are_never_replaced() {
    let oracle = two_parent_oracle();
    let mut knowledge = Knowledge::new();
    knowledge.set_required("A", "C").unwrap();
    let mut g = two_parent_block();
    let result = introduce(&mut g, &oracle, &knowledge, LatentCheck::Direct);

    assert_eq!(result.latents.len(), 1);
    assert_eq!(result.latents.blocks()[0].parents, vec!["B"]);
    assert_eq!(edge(&g, "A", "C").as_deref(), Some("A --> C"));
    assert!(!knowledge.is_violated_by(&g));
}

#[test]
fn t06_latent_sits_above_its_children() {
    let oracle = two_parent_oracle();
    let mut g = two_parent_block();
    let c = g.id("C").unwrap();
    let d = g.id("D").unwrap();
    g.node_mut(c).unwrap().position = (0.0, 100.0);
    g.node_mut(d).unwrap().position = (100.0, 300.0);

    introduce(&mut g, &oracle, &Knowledge::new(), LatentCheck::Minimal);

    let l1 = g.id("L1").unwrap();
    assert_eq!(g.node(l1).unwrap().position, (50.0, 120.0));
}

#[test]
fn t07_cancelled_introduction() {
    let oracle = two_parent_oracle();
    let sepsets = SepsetMap::new();
    let knowledge = Knowledge::new();
    let engine = OrientationEngine::new(&oracle, &sepsets, &knowledge);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut g = two_parent_block();
    let err = LatentIntroducer::new(&oracle, &engine)
        .with_cancellation(cancel)
        .introduce(&mut g)
        .unwrap_err();
    assert!(err.is_cancelled());
}

// =============================================================================
// Hierarchy
// =============================================================================

#[test]
fn t08_hierarchy_follows_parent_set_inclusion() {
    let mut g = Graph::with_observed(["A", "B", "C", "D", "E", "F"]).unwrap();
    for name in ["L1", "L2"] {
        g.add_node(Node::latent(name)).unwrap();
    }
    for (x, y) in [
        ("A", "L1"),
        ("L1", "C"),
        ("L1", "D"),
        ("A", "L2"),
        ("B", "L2"),
        ("L2", "E"),
        ("L2", "F"),
    ] {
        g.add_edge_by_name(x, T, y, A).unwrap();
    }
    let mut latents = LatentMap::new();
    latents.insert(block("L1", &["A"], &["C", "D"]));
    latents.insert(block("L2", &["A", "B"], &["E", "F"]));

    let added = arrange_hierarchy(&mut g, &latents).unwrap();

    assert_eq!(added, vec![("L1".to_string(), "L2".to_string())]);
    assert_eq!(edge(&g, "L1", "L2").as_deref(), Some("L1 --> L2"));
    assert_eq!(edge(&g, "A", "L2"), None);
    assert_eq!(edge(&g, "B", "L2").as_deref(), Some("B --> L2"));
}

#[test]
fn t09_hierarchy_uses_only_the_covering_relation() {
    let mut g = Graph::with_observed(["A", "B", "C", "X", "Y", "Z"]).unwrap();
    for name in ["L1", "L2", "L3"] {
        g.add_node(Node::latent(name)).unwrap();
    }
    for (x, y) in [
        ("A", "L1"),
        ("L1", "X"),
        ("A", "L2"),
        ("B", "L2"),
        ("L2", "Y"),
        ("A", "L3"),
        ("B", "L3"),
        ("C", "L3"),
        ("L3", "Z"),
    ] {
        g.add_edge_by_name(x, T, y, A).unwrap();
    }
    let mut latents = LatentMap::new();
    latents.insert(block("L1", &["A"], &["X"]));
    latents.insert(block("L2", &["A", "B"], &["Y"]));
    latents.insert(block("L3", &["A", "B", "C"], &["Z"]));

    let added = arrange_hierarchy(&mut g, &latents).unwrap();

    assert_eq!(
        added,
        vec![
            ("L1".to_string(), "L2".to_string()),
            ("L2".to_string(), "L3".to_string()),
        ]
    );
    assert_eq!(edge(&g, "L1", "L3"), None);
    let l3 = g.id("L3").unwrap();
    let parents: Vec<&str> = g.parents(l3).into_iter().map(|p| g.name(p)).collect();
    assert_eq!(parents, vec!["C", "L2"]);
}
