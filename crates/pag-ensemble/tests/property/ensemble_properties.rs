//! Property tests for ensemble policies over random per-run graphs.

use std::sync::atomic::{AtomicUsize, Ordering};

use pag_core::config::{EnsembleConfig, EnsemblePolicy};
use pag_core::{DataSet, DataType, Endpoint, Graph, PagResult};
use pag_ensemble::{BootstrapAggregator, EnsembleResult};
use proptest::prelude::*;

const NAMES: [&str; 4] = ["A", "B", "C", "D"];
const MARKS: [Endpoint; 3] = [Endpoint::Tail, Endpoint::Arrow, Endpoint::Circle];

/// One graph per run; each pair is absent (code 0) or has the marks picked
/// by the code.
fn run_graph(codes: &[u8]) -> Graph {
    let mut g = Graph::with_observed(NAMES).unwrap();
    let mut k = 0;
    for i in 0..NAMES.len() {
        for j in i + 1..NAMES.len() {
            let code = codes[k] % 10;
            k += 1;
            if code == 0 {
                continue;
            }
            let (mi, mj) = (MARKS[(code as usize - 1) / 3], MARKS[(code as usize - 1) % 3]);
            g.add_edge_by_name(NAMES[i], mi, NAMES[j], mj).unwrap();
        }
    }
    g
}

fn ensemble(script: &[Graph], policy: EnsemblePolicy) -> EnsembleResult {
    let calls = AtomicUsize::new(0);
    let algorithm = |_: &DataSet| -> PagResult<Graph> {
        Ok(script[calls.fetch_add(1, Ordering::SeqCst)].clone())
    };
    let data = DataSet::new(
        NAMES.iter().map(|s| s.to_string()).collect(),
        vec![vec![0.0; NAMES.len()]; 5],
        DataType::Continuous,
    );
    BootstrapAggregator::new(&algorithm)
        .with_config(EnsembleConfig {
            runs: script.len(),
            policy,
            parallel: false,
            ..EnsembleConfig::default()
        })
        .run(&data)
        .unwrap()
}

fn scripts() -> impl Strategy<Value = Vec<Graph>> {
    prop::collection::vec(prop::collection::vec(0u8..10, 6), 1..8)
        .prop_map(|runs| runs.iter().map(|codes| run_graph(codes)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn majority_edges_occur_in_more_than_half_the_runs(script in scripts()) {
        let result = ensemble(&script, EnsemblePolicy::Majority);
        let runs = script.len();
        for edge in result.graph.edges() {
            let seen = result.tally.type_count(&edge.node1, &edge.node2, edge.edge_type());
            prop_assert!(2 * seen > runs, "{} seen {} of {} runs", edge, seen, runs);
        }
    }

    #[test]
    fn highest_edges_beat_absence(script in scripts()) {
        let result = ensemble(&script, EnsemblePolicy::Highest);
        for edge in result.graph.edges() {
            let seen = result.tally.type_count(&edge.node1, &edge.node2, edge.edge_type());
            let absent = result.tally.type_count(&edge.node1, &edge.node2, pag_core::EdgeType::Nil);
            prop_assert!(seen > absent);
        }
    }

    #[test]
    fn preserved_equals_the_first_run(script in scripts()) {
        let result = ensemble(&script, EnsemblePolicy::Preserved);
        prop_assert!(result.graph.same_structure(&script[0]));
    }

    #[test]
    fn every_edge_distribution_sums_to_one(script in scripts()) {
        let result = ensemble(&script, EnsemblePolicy::Highest);
        for edge in result.graph.edges() {
            let total: f64 = edge.probabilities.iter().map(|p| p.probability).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
    }
}
