//! Skeleton, orientation and optional latent introduction as one run.

use std::sync::Arc;

use tracing::{info, warn};

use pag_core::{
    CancellationToken, DataSet, Graph, GuardedOracle, IndependenceTest, Knowledge, PagConfig, PagResult,
    SepsetMap,
};

use crate::latent::{LatentIntroducer, LatentResult};
use crate::markup::{mark_edge_specializations, MarkupSummary};
use crate::orient::{OrientationEngine, OrientationReport};
use crate::skeleton::SkeletonSearch;

/// Skeleton counters carried into the pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonStats {
    pub depth_reached: usize,
    pub tests_run: usize,
    pub timeouts: usize,
}

#[derive(Debug, Clone)]
pub struct PagOutput {
    pub graph: Graph,
    pub sepsets: SepsetMap,
    pub skeleton: SkeletonStats,
    pub orientation: OrientationReport,
    /// Present when latent introduction is enabled.
    pub latents: Option<LatentResult>,
    /// Present when `orientation.edge_markup` is set.
    pub markup: Option<MarkupSummary>,
}

/// One configured pipeline. Each `run` builds its own graph, so a pipeline
/// can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct PagPipeline {
    config: PagConfig,
    knowledge: Knowledge,
    cancel: CancellationToken,
}

impl PagPipeline {
    pub fn new(config: PagConfig) -> PagResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            knowledge: Knowledge::new(),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_knowledge(mut self, knowledge: Knowledge) -> PagResult<Self> {
        knowledge.validate()?;
        self.knowledge = knowledge;
        Ok(self)
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &PagConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    /// Run over every variable the oracle knows.
    pub fn run(&self, oracle: Arc<dyn IndependenceTest>) -> PagResult<PagOutput> {
        let variables = oracle.variables();
        self.run_with_variables(oracle, &variables)
    }

    /// Run over the columns of `data`, after checking the oracle accepts its type.
    pub fn run_on_data(&self, data: &DataSet, oracle: Arc<dyn IndependenceTest>) -> PagResult<PagOutput> {
        oracle.check_data_type(data.data_type)?;
        self.run_with_variables(oracle, &data.variables)
    }

    pub fn run_with_variables(
        &self,
        oracle: Arc<dyn IndependenceTest>,
        variables: &[String],
    ) -> PagResult<PagOutput> {
        let oracle = GuardedOracle::new(oracle)
            .with_timeout_ms(self.config.skeleton.test_timeout_ms)
            .with_workers(self.config.skeleton.test_workers);

        let skeleton = SkeletonSearch::new(&oracle, &self.knowledge)
            .with_config(self.config.skeleton.clone())
            .with_cancellation(self.cancel.clone())
            .search(variables)?;
        let stats = SkeletonStats {
            depth_reached: skeleton.depth_reached,
            tests_run: skeleton.tests_run,
            timeouts: skeleton.timeouts,
        };
        let mut graph = skeleton.graph;
        let sepsets = skeleton.sepsets;

        let (orientation, latents) = {
            let engine = OrientationEngine::new(&oracle, &sepsets, &self.knowledge)
                .with_config(self.config.orientation.clone())
                .with_cancellation(self.cancel.clone());
            let orientation = engine.orient(&mut graph)?;
            let latents = if self.config.latent.enabled {
                let result = LatentIntroducer::new(&oracle, &engine)
                    .with_config(self.config.latent.clone())
                    .with_cancellation(self.cancel.clone())
                    .introduce(&mut graph)?;
                Some(result)
            } else {
                None
            };
            (orientation, latents)
        };

        let markup = if self.config.orientation.edge_markup {
            Some(mark_edge_specializations(&mut graph)?)
        } else {
            None
        };

        let violations = self.knowledge.violations(&graph);
        if !violations.is_empty() {
            warn!(count = violations.len(), "output contradicts knowledge");
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            latents = latents.as_ref().map_or(0, |l| l.latents.len()),
            "pipeline complete"
        );
        Ok(PagOutput {
            graph,
            sepsets,
            skeleton: stats,
            orientation,
            latents,
            markup,
        })
    }
}
