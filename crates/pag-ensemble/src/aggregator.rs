//! Bootstrap aggregation over a black-box search.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use pag_core::config::{EnsembleConfig, EnsemblePolicy};
use pag_core::errors::EnsembleError;
use pag_core::{
    Cancellable, CancellationToken, DataSet, Graph, IndependenceTest, PagError, PagResult,
};
use pag_search::PagPipeline;

use crate::policy;
use crate::resample::Resampler;
use crate::tally::{EdgeTally, Observation};

/// One search over one (resampled) dataset.
pub trait SearchAlgorithm: Send + Sync {
    fn search(&self, data: &DataSet) -> PagResult<Graph>;
}

impl<F> SearchAlgorithm for F
where
    F: Fn(&DataSet) -> PagResult<Graph> + Send + Sync,
{
    fn search(&self, data: &DataSet) -> PagResult<Graph> {
        self(data)
    }
}

/// The full pipeline as a search, with an oracle built per dataset.
pub struct PipelineAlgorithm<F> {
    pipeline: PagPipeline,
    oracle_for: F,
}

impl<F> PipelineAlgorithm<F>
where
    F: Fn(&DataSet) -> Arc<dyn IndependenceTest> + Send + Sync,
{
    pub fn new(pipeline: PagPipeline, oracle_for: F) -> Self {
        Self {
            pipeline,
            oracle_for,
        }
    }
}

impl<F> SearchAlgorithm for PipelineAlgorithm<F>
where
    F: Fn(&DataSet) -> Arc<dyn IndependenceTest> + Send + Sync,
{
    fn search(&self, data: &DataSet) -> PagResult<Graph> {
        let oracle = (self.oracle_for)(data);
        Ok(self.pipeline.run_on_data(data, oracle)?.graph)
    }
}

#[derive(Debug)]
pub struct EnsembleResult {
    /// Merged graph; every edge carries its pair's type distribution.
    pub graph: Graph,
    pub policy: EnsemblePolicy,
    /// Graphs in run order. With `include_original`, run 0 used the
    /// unresampled data.
    pub run_graphs: Vec<Graph>,
    pub tally: EdgeTally,
}

impl EnsembleResult {
    pub fn runs(&self) -> usize {
        self.run_graphs.len()
    }
}

pub struct BootstrapAggregator<'a> {
    algorithm: &'a dyn SearchAlgorithm,
    config: EnsembleConfig,
    cancel: CancellationToken,
}

impl<'a> BootstrapAggregator<'a> {
    pub fn new(algorithm: &'a dyn SearchAlgorithm) -> Self {
        Self {
            algorithm,
            config: EnsembleConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: EnsembleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    pub fn run(&self, data: &DataSet) -> PagResult<EnsembleResult> {
        let extra = usize::from(self.config.include_original);
        let total = self.config.runs + extra;
        if total == 0 {
            return Err(EnsembleError::NoRuns.into());
        }
        if data.is_empty() {
            return Err(EnsembleError::EmptyDataSet.into());
        }
        let resampler = Resampler::new(
            self.config.resample_fraction,
            self.config.with_replacement,
            self.config.seed,
        )?;
        let _span = pag_core::bootstrap_span!(total, self.config.policy).entered();

        let tally = EdgeTally::new();
        let run_one = |run: usize| -> PagResult<Graph> {
            self.cancel.check("bootstrap")?;
            let sample = if run < extra {
                data.clone()
            } else {
                resampler.resample(run - extra, data)?
            };
            let graph = self.algorithm.search(&sample).map_err(|e| run_failed(run, e))?;
            tally.record(&graph);
            debug!(run, rows = sample.num_rows(), edges = graph.edge_count(), "bootstrap run complete");
            Ok(graph)
        };
        let run_graphs: Vec<Graph> = if self.config.parallel {
            (0..total).into_par_iter().map(run_one).collect::<PagResult<_>>()?
        } else {
            (0..total).map(run_one).collect::<PagResult<_>>()?
        };

        let mut graph = match self.config.policy {
            EnsemblePolicy::Preserved => run_graphs.first().cloned().unwrap_or_default(),
            EnsemblePolicy::Highest => merge(&run_graphs, &tally, policy::highest)?,
            EnsemblePolicy::Majority => merge(&run_graphs, &tally, |c| policy::majority(c, total))?,
        };
        annotate(&mut graph, &tally)?;

        info!(
            runs = total,
            policy = %self.config.policy,
            pairs_seen = tally.pairs().len(),
            edges = graph.edge_count(),
            "bootstrap ensemble complete"
        );
        Ok(EnsembleResult {
            graph,
            policy: self.config.policy,
            run_graphs,
            tally,
        })
    }
}

fn run_failed(run: usize, err: PagError) -> PagError {
    if err.is_cancelled() {
        err
    } else {
        EnsembleError::RunFailed {
            run,
            reason: err.to_string(),
        }
        .into()
    }
}

/// Nodes of every run, first appearance first, with one edge per pair the
/// selector keeps.
fn merge<S>(runs: &[Graph], tally: &EdgeTally, select: S) -> PagResult<Graph>
where
    S: Fn(&BTreeMap<Observation, usize>) -> Option<Observation>,
{
    let mut graph = Graph::new();
    for run in runs {
        for id in run.nodes() {
            if let Some(node) = run.node(id) {
                if !graph.contains(&node.name) {
                    graph.add_node(node.clone())?;
                }
            }
        }
    }
    for (a, b) in tally.pairs() {
        let Some(winner) = select(&tally.counts(&a, &b)) else {
            continue;
        };
        let Some((mark_a, mark_b)) = winner.edge_type.marks() else {
            continue;
        };
        let (ia, ib) = (graph.require(&a)?, graph.require(&b)?);
        graph.add_edge(ia, mark_a, ib, mark_b)?;
        for property in winner.properties {
            graph.add_edge_property(ia, ib, property)?;
        }
    }
    Ok(graph)
}

fn annotate(graph: &mut Graph, tally: &EdgeTally) -> PagResult<()> {
    for (a, b) in graph.edge_pairs() {
        let probabilities = tally.probabilities(graph.name(a), graph.name(b));
        graph.set_edge_probabilities(a, b, probabilities)?;
    }
    Ok(())
}
