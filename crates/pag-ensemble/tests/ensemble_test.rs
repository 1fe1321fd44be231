//! Bootstrap ensemble tests: policies, edge-type distributions, resampling,
//! errors, edge markup, and graph comparison.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pag_core::config::{EnsembleConfig, EnsemblePolicy};
use pag_core::errors::{EnsembleError, SearchError};
use pag_core::graph::EdgeTypeProbability;
use pag_core::{
    Cancellable, CancellationToken, DataSet, DataType, EdgeProperty, EdgeType, Endpoint, Graph, IndependenceTest,
    PagConfig, PagError, PagResult,
};
use pag_ensemble::{
    adjacency_confusion, edge_type_confusion, BootstrapAggregator, EnsembleResult, PipelineAlgorithm, Resampler,
};
use pag_search::PagPipeline;
use test_fixtures::DagOracle;

use Endpoint::{Arrow as A, Circle as C, Tail as T};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn graph(edges: &[(&str, Endpoint, &str, Endpoint)]) -> Graph {
    let mut g = Graph::with_observed(["A", "B", "C"]).unwrap();
    for &(x, mx, y, my) in edges {
        g.add_edge_by_name(x, mx, y, my).unwrap();
    }
    g
}

fn data(rows: usize) -> DataSet {
    DataSet::new(
        vec!["A".into(), "B".into(), "C".into()],
        (0..rows).map(|i| vec![i as f64, i as f64 * 2.0, i as f64 * 3.0]).collect(),
        DataType::Continuous,
    )
}

fn sequential(runs: usize, policy: EnsemblePolicy) -> EnsembleConfig {
    EnsembleConfig {
        runs,
        policy,
        parallel: false,
        ..EnsembleConfig::default()
    }
}

/// Runs the ensemble with a search that returns `script[i]` on its i-th call.
fn run_scripted(script: &[Graph], config: EnsembleConfig) -> PagResult<EnsembleResult> {
    let calls = AtomicUsize::new(0);
    let algorithm = |_: &DataSet| -> PagResult<Graph> {
        let i = calls.fetch_add(1, Ordering::SeqCst);
        Ok(script[i % script.len()].clone())
    };
    BootstrapAggregator::new(&algorithm)
        .with_config(config)
        .run(&data(20))
}

fn edge_strings(g: &Graph) -> Vec<String> {
    g.edges().iter().map(|e| e.to_string()).collect()
}

fn distribution(g: &Graph, x: &str, y: &str) -> Vec<(EdgeType, f64)> {
    g.edge_by_name(x, y)
        .unwrap()
        .probabilities
        .iter()
        .map(|p| (p.edge_type, p.probability))
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

// =============================================================================
// Policies
// =============================================================================

#[test]
fn t01_majority_keeps_types_seen_in_more_than_half_the_runs() {
    let with_bc = graph(&[("A", T, "B", A), ("B", C, "C", C)]);
    let directed = graph(&[("A", T, "B", A)]);
    let bidirected = graph(&[("A", A, "B", A)]);
    let script = [with_bc.clone(), with_bc, directed, bidirected.clone(), bidirected];

    let result = run_scripted(&script, sequential(5, EnsemblePolicy::Majority)).unwrap();

    assert_eq!(result.runs(), 5);
    // B o-o C appeared in only 2 of 5 runs.
    assert_eq!(edge_strings(&result.graph), vec!["A --> B"]);
    let dist = distribution(&result.graph, "A", "B");
    assert_eq!(dist.len(), 2);
    assert_eq!(dist[0].0, EdgeType::Ta);
    assert_close(dist[0].1, 0.6);
    assert_eq!(dist[1].0, EdgeType::Aa);
    assert_close(dist[1].1, 0.4);
}

#[test]
fn t02_highest_counts_absence_as_a_candidate() {
    let script = [
        graph(&[("A", T, "B", A), ("B", C, "C", C)]),
        graph(&[("A", T, "B", A), ("B", C, "C", C)]),
        graph(&[("B", A, "C", A)]),
        graph(&[("B", T, "C", A)]),
        graph(&[]),
    ];

    let highest = run_scripted(&script, sequential(5, EnsemblePolicy::Highest)).unwrap();
    // A-B: present twice, absent three times. B-C: o-o twice beats absence once.
    assert_eq!(edge_strings(&highest.graph), vec!["B o-o C"]);

    let majority = run_scripted(&script, sequential(5, EnsemblePolicy::Majority)).unwrap();
    assert!(majority.graph.edges().is_empty());
    assert_eq!(majority.graph.node_names(), vec!["A", "B", "C"]);
}

#[test]
fn t03_highest_tie_with_absence_drops_the_edge() {
    let script = [graph(&[("A", T, "B", A)]), graph(&[])];
    let result = run_scripted(&script, sequential(4, EnsemblePolicy::Highest)).unwrap();
    assert!(result.graph.edges().is_empty());
    assert_eq!(result.tally.type_count("A", "B", EdgeType::Ta), 2);
    assert_eq!(result.tally.type_count("B", "A", EdgeType::Nil), 2);
}

#[test]
fn t04_preserved_keeps_the_original_data_run() {
    let calls = AtomicUsize::new(0);
    let algorithm = |d: &DataSet| -> PagResult<Graph> {
        calls.fetch_add(1, Ordering::SeqCst);
        if d.num_rows() == 20 {
            Ok(graph(&[("A", T, "B", A)]))
        } else {
            Ok(graph(&[("A", C, "B", C)]))
        }
    };
    let config = EnsembleConfig {
        include_original: true,
        resample_fraction: 0.5,
        with_replacement: false,
        ..sequential(4, EnsemblePolicy::Preserved)
    };

    let result = BootstrapAggregator::new(&algorithm)
        .with_config(config)
        .run(&data(20))
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(result.runs(), 5);
    assert!(result.graph.same_structure(&result.run_graphs[0]));
    assert_eq!(edge_strings(&result.graph), vec!["A --> B"]);
    let dist = distribution(&result.graph, "A", "B");
    assert_eq!(dist[0].0, EdgeType::Ta);
    assert_close(dist[0].1, 0.2);
    assert_eq!(dist[1].0, EdgeType::Cc);
    assert_close(dist[1].1, 0.8);
}

#[test]
fn t05_distributions_include_absence_and_sum_to_one() {
    let script = [
        graph(&[("B", C, "C", C)]),
        graph(&[("B", C, "C", C)]),
        graph(&[("B", A, "C", A)]),
        graph(&[("C", A, "B", T)]),
        graph(&[]),
    ];
    let result = run_scripted(&script, sequential(5, EnsemblePolicy::Highest)).unwrap();

    let probabilities: Vec<EdgeTypeProbability> =
        result.graph.edge_by_name("B", "C").unwrap().probabilities;
    let types: Vec<EdgeType> = probabilities.iter().map(|p| p.edge_type).collect();
    assert_eq!(types, vec![EdgeType::Nil, EdgeType::Ta, EdgeType::Cc, EdgeType::Aa]);
    let total: f64 = probabilities.iter().map(|p| p.probability).sum();
    assert_close(total, 1.0);
}

#[test]
fn t06_pipeline_ensemble_matches_a_single_run_on_a_stable_oracle() {
    let pipeline = PagPipeline::new(PagConfig::default()).unwrap();
    let oracle_for = |_: &DataSet| -> Arc<dyn IndependenceTest> {
        Arc::new(DagOracle::new(&[("A", "B"), ("C", "B")]))
    };
    let algorithm = PipelineAlgorithm::new(pipeline.clone(), oracle_for);
    let config = EnsembleConfig {
        runs: 6,
        ..EnsembleConfig::default()
    };

    let result = BootstrapAggregator::new(&algorithm)
        .with_config(config)
        .run(&data(30))
        .unwrap();

    let single = pipeline
        .run_on_data(&data(30), Arc::new(DagOracle::new(&[("A", "B"), ("C", "B")])))
        .unwrap();
    assert!(result.graph.same_structure(&single.graph));
    assert_eq!(edge_strings(&result.graph), vec!["A o-> B", "B <-o C"]);
    for edge in result.graph.edges() {
        assert_eq!(edge.probabilities.len(), 1);
        assert_close(edge.probabilities[0].probability, 1.0);
    }
}

#[test]
fn t07_parallel_and_sequential_runs_tally_alike() {
    let algorithm = |d: &DataSet| -> PagResult<Graph> {
        // Parity of the first sampled row decides the orientation.
        if d.rows[0][0] as usize % 2 == 0 {
            Ok(graph(&[("A", T, "B", A)]))
        } else {
            Ok(graph(&[("A", A, "B", A)]))
        }
    };
    let run = |parallel: bool| {
        BootstrapAggregator::new(&algorithm)
            .with_config(EnsembleConfig {
                runs: 12,
                parallel,
                ..EnsembleConfig::default()
            })
            .run(&data(25))
            .unwrap()
    };
    let (par, seq) = (run(true), run(false));
    assert_eq!(par.tally.counts("A", "B"), seq.tally.counts("A", "B"));
    assert!(par.graph.same_structure(&seq.graph));
}

// =============================================================================
// Resampling
// =============================================================================

#[test]
fn t08_resampler_sizes_and_bounds() {
    let half = Resampler::new(0.5, false, 42).unwrap();
    assert_eq!(half.sample_size(21), 11);
    let idx = half.indices(0, 21);
    assert_eq!(idx.len(), 11);
    assert!(idx.windows(2).all(|w| w[0] < w[1]), "sorted and distinct");
    assert!(idx.iter().all(|&i| i < 21));

    let double = Resampler::new(2.0, true, 42).unwrap();
    let idx = double.indices(3, 20);
    assert_eq!(idx.len(), 40);
    assert!(idx.iter().all(|&i| i < 20));

    let tiny = Resampler::new(0.1, true, 42).unwrap();
    assert_eq!(tiny.sample_size(1), 1);
}

#[test]
fn t09_resampling_is_seeded_per_run() {
    let r1 = Resampler::new(0.5, false, 7).unwrap();
    let r2 = Resampler::new(0.5, false, 7).unwrap();
    assert_eq!(r1.indices(3, 100), r2.indices(3, 100));
    assert_ne!(r1.indices(0, 100), r1.indices(1, 100));

    let sample = r1.resample(2, &data(100)).unwrap();
    assert_eq!(sample.num_rows(), 50);
    assert_eq!(sample.variables, vec!["A", "B", "C"]);
}

// =============================================================================
// Errors and cancellation
// =============================================================================

#[test]
fn t10_invalid_resample_fractions_are_rejected() {
    for (fraction, with_replacement) in [(1.5, false), (0.0, true), (-0.5, true), (f64::NAN, true)] {
        assert!(matches!(
            Resampler::new(fraction, with_replacement, 1),
            Err(PagError::EnsembleError(EnsembleError::InvalidResampleFraction { .. }))
        ));
    }
    assert!(Resampler::new(1.5, true, 1).is_ok());
}

#[test]
fn t11_zero_runs_and_empty_data_fail() {
    let algorithm = |_: &DataSet| -> PagResult<Graph> { Ok(graph(&[])) };

    let err = BootstrapAggregator::new(&algorithm)
        .with_config(sequential(0, EnsemblePolicy::Majority))
        .run(&data(10))
        .unwrap_err();
    assert!(matches!(err, PagError::EnsembleError(EnsembleError::NoRuns)));

    let err = BootstrapAggregator::new(&algorithm)
        .with_config(sequential(3, EnsemblePolicy::Majority))
        .run(&data(0))
        .unwrap_err();
    assert!(matches!(err, PagError::EnsembleError(EnsembleError::EmptyDataSet)));

    // The original-data run alone is enough.
    let only_original = EnsembleConfig {
        include_original: true,
        ..sequential(0, EnsemblePolicy::Preserved)
    };
    let result = BootstrapAggregator::new(&algorithm)
        .with_config(only_original)
        .run(&data(10))
        .unwrap();
    assert_eq!(result.runs(), 1);
}

#[test]
fn t12_failed_run_is_reported_with_its_index() {
    let calls = AtomicUsize::new(0);
    let algorithm = |_: &DataSet| -> PagResult<Graph> {
        if calls.fetch_add(1, Ordering::SeqCst) == 2 {
            Err(SearchError::InvalidDepth { depth: -5 }.into())
        } else {
            Ok(graph(&[]))
        }
    };
    let err = BootstrapAggregator::new(&algorithm)
        .with_config(sequential(5, EnsemblePolicy::Majority))
        .run(&data(10))
        .unwrap_err();
    match err {
        PagError::EnsembleError(EnsembleError::RunFailed { run, reason }) => {
            assert_eq!(run, 2);
            assert!(reason.contains("-5"), "reason was {reason}");
        }
        other => panic!("expected RunFailed, got {other:?}"),
    }
}

#[test]
fn t13_cancelled_ensemble_stops() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let algorithm = |_: &DataSet| -> PagResult<Graph> { Ok(graph(&[])) };
    let err = BootstrapAggregator::new(&algorithm)
        .with_config(sequential(3, EnsemblePolicy::Majority))
        .with_cancellation(cancel)
        .run(&data(10))
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(matches!(
        err,
        PagError::SearchError(SearchError::Cancelled { ref stage }) if stage == "bootstrap"
    ));
}

// =============================================================================
// Comparison and serialization
// =============================================================================

#[test]
fn t14_confusion_against_a_reference() {
    let names = ["A", "B", "C", "D"];
    let mut reference = Graph::with_observed(names).unwrap();
    reference.add_edge_by_name("A", T, "B", A).unwrap();
    reference.add_edge_by_name("B", T, "C", A).unwrap();
    let mut estimate = Graph::with_observed(names).unwrap();
    estimate.add_edge_by_name("A", T, "B", A).unwrap();
    estimate.add_edge_by_name("A", C, "C", C).unwrap();

    let adj = adjacency_confusion(&reference, &estimate);
    assert_eq!(
        (adj.true_positives, adj.false_positives, adj.false_negatives, adj.true_negatives),
        (1, 1, 1, 3)
    );
    assert_close(adj.precision().unwrap(), 0.5);
    assert_close(adj.recall().unwrap(), 0.5);

    let types = edge_type_confusion(&reference, &estimate);
    assert_eq!(types.total(), 6);
    assert_eq!(types.get(EdgeType::Ta, EdgeType::Ta), 1);
    assert_eq!(types.get(EdgeType::Nil, EdgeType::Cc), 1);
    assert_eq!(types.get(EdgeType::Ta, EdgeType::Nil), 1);
    assert_eq!(types.get(EdgeType::Nil, EdgeType::Nil), 3);
    assert_close(types.accuracy().unwrap(), 4.0 / 6.0);

    let empty = adjacency_confusion(&Graph::new(), &Graph::new());
    assert_eq!(empty.precision(), None);
}

#[test]
fn t15_edge_probabilities_serialize_with_lowercase_types() {
    let script = [graph(&[("A", T, "B", A)]), graph(&[("A", C, "B", A)])];
    let result = run_scripted(&script, sequential(2, EnsemblePolicy::Preserved)).unwrap();
    let edge = result.graph.edge_by_name("A", "B").unwrap();
    let json = serde_json::to_value(&edge.probabilities).unwrap();
    assert_eq!(json[0]["edge_type"], "ta");
    assert_eq!(json[1]["edge_type"], "ca");
    assert_eq!(json[0]["probability"], 0.5);
}

#[test]
fn t16_edge_markup_survives_aggregation() {
    let mut config = PagConfig::default();
    config.orientation.edge_markup = true;
    let pipeline = PagPipeline::new(config).unwrap();
    let oracle_for = |_: &DataSet| -> Arc<dyn IndependenceTest> {
        Arc::new(DagOracle::new(&[("A", "C"), ("B", "C"), ("C", "D")]))
    };
    let algorithm = PipelineAlgorithm::new(pipeline, oracle_for);
    let data = DataSet::new(
        vec!["A".into(), "B".into(), "C".into(), "D".into()],
        (0..20).map(|i| vec![i as f64; 4]).collect(),
        DataType::Continuous,
    );

    let result = BootstrapAggregator::new(&algorithm)
        .with_config(sequential(3, EnsemblePolicy::Highest))
        .run(&data)
        .unwrap();

    let expected: BTreeSet<EdgeProperty> = [EdgeProperty::Pd, EdgeProperty::Nl].into();
    let cd = result.graph.edge_by_name("C", "D").unwrap();
    assert_eq!(cd.to_string(), "C --> D");
    assert_eq!(cd.properties, expected);
    assert_eq!(cd.probabilities.len(), 1);
    assert_eq!(cd.probabilities[0].edge_type, EdgeType::Ta);
    assert_eq!(cd.probabilities[0].properties, expected);
    assert_close(cd.probabilities[0].probability, 1.0);

    // Partially oriented edges carry no tags.
    assert!(result.graph.edge_by_name("A", "C").unwrap().properties.is_empty());
}
