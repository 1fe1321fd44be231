use std::sync::Arc;

use pag_core::config::{LatentConfig, SkeletonConfig};
use pag_core::{GuardedOracle, Knowledge};
use pag_search::{LatentIntroducer, OrientationEngine, SkeletonResult, SkeletonSearch};
use proptest::prelude::*;
use test_fixtures::DagOracle;

const NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// A DAG over the first `n` names; `mask[k]` switches the k-th forward pair on.
fn dag(n: usize, mask: &[bool]) -> (Vec<&'static str>, Vec<(&'static str, &'static str)>) {
    let nodes: Vec<&str> = NAMES[..n].to_vec();
    let mut edges = Vec::new();
    let mut k = 0;
    for i in 0..n {
        for j in i + 1..n {
            if mask[k] {
                edges.push((NAMES[i], NAMES[j]));
            }
            k += 1;
        }
    }
    (nodes, edges)
}

fn oracle(n: usize, mask: &[bool]) -> GuardedOracle {
    let (nodes, edges) = dag(n, mask);
    GuardedOracle::new(Arc::new(DagOracle::with_nodes(&nodes, &edges)))
}

fn skeleton(oracle: &GuardedOracle, knowledge: &Knowledge, parallel: bool) -> SkeletonResult {
    let variables = oracle.variables();
    SkeletonSearch::new(oracle, knowledge)
        .with_config(SkeletonConfig {
            parallel,
            ..SkeletonConfig::default()
        })
        .search(&variables)
        .unwrap()
}

fn edge_list(result: &SkeletonResult) -> Vec<String> {
    result.graph.edges().iter().map(|e| e.to_string()).collect()
}

fn arb_dag() -> impl Strategy<Value = (usize, Vec<bool>)> {
    (3usize..=6, prop::collection::vec(any::<bool>(), 15))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn skeleton_matches_true_adjacencies((n, mask) in arb_dag()) {
        let oracle = oracle(n, &mask);
        let result = skeleton(&oracle, &Knowledge::new(), true);
        let (_, edges) = dag(n, &mask);

        prop_assert_eq!(result.graph.edge_count(), edges.len());
        for (a, b) in edges {
            prop_assert!(result.graph.edge_by_name(a, b).is_some(), "missing {} - {}", a, b);
        }
    }

    #[test]
    fn parallel_and_sequential_skeletons_agree((n, mask) in arb_dag()) {
        let oracle = oracle(n, &mask);
        let knowledge = Knowledge::new();
        let parallel = skeleton(&oracle, &knowledge, true);
        let sequential = skeleton(&oracle, &knowledge, false);

        prop_assert_eq!(edge_list(&parallel), edge_list(&sequential));
        prop_assert_eq!(parallel.sepsets.len(), sequential.sepsets.len());
    }

    #[test]
    fn orientation_reaches_a_fixpoint((n, mask) in arb_dag()) {
        let oracle = oracle(n, &mask);
        let knowledge = Knowledge::new();
        let result = skeleton(&oracle, &knowledge, true);
        let mut g = result.graph;
        let engine = OrientationEngine::new(&oracle, &result.sepsets, &knowledge);

        let first = engine.orient(&mut g).unwrap();
        prop_assert!(first.converged);
        let snapshot = g.clone();
        let second = engine.complete(&mut g).unwrap();

        prop_assert_eq!(second.total_changes(), 0);
        prop_assert!(g.same_structure(&snapshot));
    }

    #[test]
    fn knowledge_is_never_contradicted(
        (n, mask) in arb_dag(),
        forbid in (0usize..6, 0usize..6),
        require in (0usize..6, 0usize..6),
    ) {
        let mut knowledge = Knowledge::new();
        let (f_to, f_from) = (forbid.0 % n, forbid.1 % n);
        if f_to < f_from {
            knowledge.set_forbidden(NAMES[f_from], NAMES[f_to]).unwrap();
        }
        let (r_from, r_to) = (require.0 % n, require.1 % n);
        if r_from < r_to {
            knowledge.set_required(NAMES[r_from], NAMES[r_to]).unwrap();
        }

        let oracle = oracle(n, &mask);
        let result = skeleton(&oracle, &knowledge, true);
        let mut g = result.graph;
        OrientationEngine::new(&oracle, &result.sepsets, &knowledge)
            .orient(&mut g)
            .unwrap();

        prop_assert!(!knowledge.is_violated_by(&g), "violations: {:?}", knowledge.violations(&g));
    }

    #[test]
    fn latent_blocks_are_well_formed((n, mask) in arb_dag()) {
        let oracle = oracle(n, &mask);
        let knowledge = Knowledge::new();
        let result = skeleton(&oracle, &knowledge, true);
        let mut g = result.graph;
        let engine = OrientationEngine::new(&oracle, &result.sepsets, &knowledge);
        engine.orient(&mut g).unwrap();

        let latents = LatentIntroducer::new(&oracle, &engine)
            .with_config(LatentConfig { enabled: true, ..LatentConfig::default() })
            .introduce(&mut g)
            .unwrap();

        for block in latents.latents.blocks() {
            prop_assert!(!block.parents.is_empty());
            prop_assert!(block.children.len() >= 2);
            prop_assert!(block.parents.iter().all(|p| !block.children.contains(p)));
            let id = g.id(&block.latent).unwrap();
            prop_assert!(g.is_latent(id));
        }
    }
}
