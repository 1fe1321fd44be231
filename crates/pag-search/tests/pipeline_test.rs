//! End-to-end pipeline tests: data-type checks, report metadata, and the
//! optional markup stage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pag_core::config::ColliderStrategyKind;
use pag_core::errors::SearchError;
use pag_core::{
    DataSet, DataType, GuardedOracle, IndependenceResult, IndependenceTest, Knowledge, PagConfig, PagError,
    PagResult,
};
use pag_search::{MarkupSummary, PagPipeline, SkeletonSearch};
use test_fixtures::DagOracle;

/// Accepts only continuous data and counts the type checks it receives.
struct ContinuousOnly {
    inner: DagOracle,
    type_checks: AtomicUsize,
}

impl ContinuousOnly {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: DagOracle::new(&[("A", "C"), ("B", "C")]),
            type_checks: AtomicUsize::new(0),
        })
    }
}

impl IndependenceTest for ContinuousOnly {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult> {
        self.inner.check_independence(x, y, z)
    }

    fn variables(&self) -> Vec<String> {
        self.inner.variables()
    }

    fn alpha(&self) -> f64 {
        0.01
    }

    fn check_data_type(&self, data_type: DataType) -> PagResult<()> {
        self.type_checks.fetch_add(1, Ordering::SeqCst);
        match data_type {
            DataType::Continuous => Ok(()),
            other => Err(SearchError::UnsupportedDataType {
                data_type: other.to_string(),
            }
            .into()),
        }
    }
}

fn data(data_type: DataType) -> DataSet {
    DataSet::new(
        vec!["A".into(), "B".into(), "C".into()],
        (0..10).map(|i| vec![i as f64; 3]).collect(),
        data_type,
    )
}

// =============================================================================
// Data type checks
// =============================================================================

#[test]
fn t01_rejected_data_type_fails_before_any_test() {
    let oracle = ContinuousOnly::new();
    let pipeline = PagPipeline::new(PagConfig::default()).unwrap();

    let err = pipeline.run_on_data(&data(DataType::Discrete), oracle.clone()).unwrap_err();

    assert!(matches!(
        err,
        PagError::SearchError(SearchError::UnsupportedDataType { ref data_type }) if data_type == "discrete"
    ));
    assert!(!err.is_recoverable());
    assert_eq!(oracle.type_checks.load(Ordering::SeqCst), 1);
    assert_eq!(oracle.inner.calls(), 0);
}

#[test]
fn t02_accepted_data_type_runs_the_search() {
    let oracle = ContinuousOnly::new();
    let pipeline = PagPipeline::new(PagConfig::default()).unwrap();

    let output = pipeline.run_on_data(&data(DataType::Continuous), oracle.clone()).unwrap();

    assert!(oracle.inner.calls() > 0);
    let edges: Vec<String> = output.graph.edges().iter().map(|e| e.to_string()).collect();
    assert_eq!(edges, vec!["A o-> C", "B o-> C"]);
}

// =============================================================================
// Report metadata
// =============================================================================

#[test]
fn t03_oracle_alpha_reaches_the_skeleton_result() {
    let oracle = GuardedOracle::new(ContinuousOnly::new());
    let knowledge = Knowledge::new();
    let result = SkeletonSearch::new(&oracle, &knowledge)
        .search(&oracle.variables())
        .unwrap();
    assert_eq!(result.alpha, 0.01);
}

#[test]
fn t04_orientation_report_names_the_strategy_and_its_window() {
    let mut config = PagConfig::default();
    config.orientation.collider_strategy = ColliderStrategyKind::MaxP;
    let pipeline = PagPipeline::new(config).unwrap();

    let output = pipeline.run(ContinuousOnly::new()).unwrap();

    assert_eq!(output.orientation.strategy, "max_p");
    assert!(output.orientation.finished_at >= output.orientation.started_at);
    assert!(output.orientation.elapsed() >= chrono::Duration::zero());
}

// =============================================================================
// Markup stage
// =============================================================================

#[test]
fn t05_markup_runs_only_when_enabled() {
    let dag = || Arc::new(DagOracle::new(&[("A", "C"), ("B", "C"), ("C", "D")]));

    let plain = PagPipeline::new(PagConfig::default()).unwrap().run(dag()).unwrap();
    assert!(plain.markup.is_none());
    assert!(plain.graph.edges().iter().all(|e| e.properties.is_empty()));

    let mut config = PagConfig::default();
    config.orientation.edge_markup = true;
    let marked = PagPipeline::new(config).unwrap().run(dag()).unwrap();
    assert_eq!(marked.markup, Some(MarkupSummary { dd: 0, pd: 1, nl: 1, pl: 0 }));
    assert_eq!(marked.graph.edge_by_name("C", "D").unwrap().properties.len(), 2);
}
