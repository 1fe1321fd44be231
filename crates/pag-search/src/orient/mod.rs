//! Orientation engine: turn a skeleton and its sepsets into a PAG.
//!
//! `orient` resets every mark to CIRCLE, applies initial marks and
//! knowledge, runs R0 through the configured collider strategy, and then
//! the rules to a fixpoint. `complete` runs only the rules, for graphs that
//! already carry marks (a CPDAG, or a PAG edited by latent introduction).
//!
//! Each outer pass runs the arrowhead rules R1 to R4 to their own fixpoint
//! and then the tail rules R5 to R10 once. Passes repeat until one changes
//! nothing or `max_passes` is reached.

mod discriminating;
mod guard;
mod paths;
mod repair;
mod report;
mod rules;
pub mod strategies;

use tracing::{info, warn};

use pag_core::config::OrientationConfig;
use pag_core::errors::SearchError;
use pag_core::{
    Cancellable, CancellationToken, Endpoint, Graph, GuardedOracle, Knowledge, PagResult, SepsetMap,
};

pub use guard::{is_arrowhead_allowed, is_tail_allowed};
pub use report::{OrientationReport, RepairAction, RepairKind, Rule, UnresolvedPath, UnresolvedReason};
pub use strategies::{ColliderDecision, ColliderStrategy};

use guard::Ctx;
use strategies::build;

pub struct OrientationEngine<'a> {
    oracle: &'a GuardedOracle,
    sepsets: &'a SepsetMap,
    knowledge: &'a Knowledge,
    config: OrientationConfig,
    initial: Option<&'a Graph>,
    cancel: CancellationToken,
}

impl<'a> OrientationEngine<'a> {
    pub fn new(oracle: &'a GuardedOracle, sepsets: &'a SepsetMap, knowledge: &'a Knowledge) -> Self {
        Self {
            oracle,
            sepsets,
            knowledge,
            config: OrientationConfig::default(),
            initial: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: OrientationConfig) -> Self {
        self.config = config;
        self
    }

    /// Marks of `initial` that are not CIRCLE survive the reset in `orient`.
    pub fn with_initial_graph(mut self, initial: &'a Graph) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &OrientationConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &'a Knowledge {
        self.knowledge
    }

    /// Orient `graph` from scratch. Adjacencies are left untouched.
    pub fn orient(&self, graph: &mut Graph) -> PagResult<OrientationReport> {
        let max_nodes = self.max_path_nodes()?;
        let strategy = self.strategy();
        let _span = pag_core::orientation_span!(self.config.collider_strategy, graph.edge_count()).entered();

        let mut report = OrientationReport::new(strategy.kind().to_string());
        graph.reorient_all_with(Endpoint::Circle);
        {
            let mut ctx = Ctx::new(graph, self.knowledge, &mut report);
            self.apply_initial(&mut ctx)?;
            rules::orient_knowledge(&mut ctx)?;
            self.cancel.check("orientation")?;
            rules::rule_r0(&mut ctx, strategy.as_ref())?;
            self.run_rules(&mut ctx, strategy.as_ref(), max_nodes)?;
            if self.config.guarantee_pag {
                self.repair(&mut ctx, strategy.as_ref(), max_nodes)?;
            }
        }
        report.finish();
        self.log_summary(&report);
        Ok(report)
    }

    /// Run the rules (and the repair, if enabled) over existing marks.
    pub fn complete(&self, graph: &mut Graph) -> PagResult<OrientationReport> {
        let max_nodes = self.max_path_nodes()?;
        let strategy = self.strategy();
        let _span = pag_core::orientation_span!(self.config.collider_strategy, graph.edge_count()).entered();

        let mut report = OrientationReport::new(strategy.kind().to_string());
        {
            let mut ctx = Ctx::new(graph, self.knowledge, &mut report);
            self.run_rules(&mut ctx, strategy.as_ref(), max_nodes)?;
            if self.config.guarantee_pag {
                self.repair(&mut ctx, strategy.as_ref(), max_nodes)?;
            }
        }
        report.finish();
        self.log_summary(&report);
        Ok(report)
    }

    fn strategy(&self) -> Box<dyn ColliderStrategy + 'a> {
        build(
            self.config.collider_strategy,
            self.oracle,
            self.sepsets,
            self.config.strategy_depth,
        )
    }

    fn max_path_nodes(&self) -> PagResult<Option<usize>> {
        match self.config.max_discriminating_path_length {
            -1 => Ok(None),
            n if n >= 4 => Ok(usize::try_from(n).ok()),
            n => Err(SearchError::InvalidPathLength { length: n }.into()),
        }
    }

    fn apply_initial(&self, ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
        let Some(initial) = self.initial else {
            return Ok(());
        };
        for edge in initial.edges() {
            let (Some(a), Some(b)) = (ctx.graph.id(&edge.node1), ctx.graph.id(&edge.node2)) else {
                continue;
            };
            if !ctx.graph.is_adjacent(a, b) {
                continue;
            }
            if edge.endpoint1 != Endpoint::Circle {
                ctx.force(b, a, edge.endpoint1, Rule::Initial)?;
            }
            if edge.endpoint2 != Endpoint::Circle {
                ctx.force(a, b, edge.endpoint2, Rule::Initial)?;
            }
        }
        Ok(())
    }

    fn run_rules(
        &self,
        ctx: &mut Ctx<'_, '_>,
        strategy: &dyn ColliderStrategy,
        max_nodes: Option<usize>,
    ) -> PagResult<()> {
        for _ in 0..self.config.max_passes {
            self.cancel.check("orientation")?;
            ctx.report.passes += 1;
            let mut changed = false;

            for _ in 0..self.config.max_passes {
                ctx.changed = false;
                rules::rule_r1(ctx)?;
                rules::rule_r2(ctx)?;
                rules::rule_r3(ctx)?;
                if self.config.discriminating_path_rule {
                    discriminating::rule_r4(ctx, strategy, max_nodes)?;
                }
                if !ctx.changed {
                    break;
                }
                changed = true;
            }

            if self.config.complete_rule_set {
                ctx.changed = false;
                rules::rule_r5(ctx)?;
                rules::rule_r6(ctx)?;
                rules::rule_r7(ctx)?;
                rules::rules_r8_to_r10(ctx)?;
                changed |= ctx.changed;
            }

            if !changed {
                ctx.report.converged = true;
                return Ok(());
            }
        }
        warn!(max_passes = self.config.max_passes, "orientation stopped before reaching a fixpoint");
        Ok(())
    }

    fn repair(
        &self,
        ctx: &mut Ctx<'_, '_>,
        strategy: &dyn ColliderStrategy,
        max_nodes: Option<usize>,
    ) -> PagResult<()> {
        let before = ctx.report.repairs.len();
        repair::guarantee_pag(ctx)?;
        if ctx.report.repairs.len() > before {
            self.run_rules(ctx, strategy, max_nodes)?;
        }
        Ok(())
    }

    fn log_summary(&self, report: &OrientationReport) {
        info!(
            strategy = %report.strategy,
            passes = report.passes,
            converged = report.converged,
            changes = report.total_changes(),
            refused = report.refused,
            ambiguous = report.ambiguous_triples.len(),
            unresolved = report.unresolved_paths.len(),
            repaired = report.repaired,
            elapsed_ms = report.elapsed().num_milliseconds(),
            "orientation complete"
        );
    }
}
