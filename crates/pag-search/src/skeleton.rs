//! Adjacency search: prune the complete graph by conditional independence.
//!
//! Depth `k` tests every adjacent pair against the size-`k` subsets of each
//! endpoint's other neighbours. Under the stable policy the neighbour sets
//! are frozen at the start of the depth, which makes the result independent
//! of pair order and lets the depth run on the rayon pool.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use pag_core::combinatorics::choose;
use pag_core::config::SkeletonConfig;
use pag_core::errors::SearchError;
use pag_core::sepset::{RemovalReason, Sepset, SepsetMap};
use pag_core::{Cancellable, CancellationToken, Endpoint, Graph, GuardedOracle, Knowledge, PagResult};

/// Output of the adjacency search. Surviving edges are undirected (`---`).
#[derive(Debug, Clone)]
pub struct SkeletonResult {
    pub graph: Graph,
    pub sepsets: SepsetMap,
    /// Largest conditioning-set size that was tested.
    pub depth_reached: usize,
    pub tests_run: usize,
    /// Tests abandoned by the timeout guard and treated as dependent.
    pub timeouts: usize,
    /// Significance level the oracle decided with.
    pub alpha: f64,
}

pub struct SkeletonSearch<'a> {
    oracle: &'a GuardedOracle,
    knowledge: &'a Knowledge,
    config: SkeletonConfig,
    cancel: CancellationToken,
}

impl<'a> SkeletonSearch<'a> {
    pub fn new(oracle: &'a GuardedOracle, knowledge: &'a Knowledge) -> Self {
        Self {
            oracle,
            knowledge,
            config: SkeletonConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: SkeletonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn search(&self, variables: &[String]) -> PagResult<SkeletonResult> {
        if self.config.depth < -1 {
            return Err(SearchError::InvalidDepth {
                depth: self.config.depth,
            }
            .into());
        }
        let _span = pag_core::skeleton_span!(variables.len(), self.config.depth).entered();
        let max_depth = usize::try_from(self.config.depth).unwrap_or(usize::MAX);

        let n = variables.len();
        let mut adj: Vec<BTreeSet<usize>> = (0..n)
            .map(|i| (0..n).filter(|&j| j != i).collect())
            .collect();
        let mut sepsets = SepsetMap::new();
        let counters = Counters::default();

        // Pairs forbidden in both directions never get tested.
        for i in 0..n {
            for j in i + 1..n {
                if self.knowledge.is_adjacency_forbidden(&variables[i], &variables[j]) {
                    adj[i].remove(&j);
                    adj[j].remove(&i);
                    sepsets.record_removal(
                        &variables[i],
                        &variables[j],
                        RemovalReason::Knowledge,
                        Sepset::empty(),
                        None,
                    );
                    debug!(x = %variables[i], y = %variables[j], "edge removed by knowledge");
                }
            }
        }

        let mut depth = 0;
        let mut depth_reached = 0;
        while depth <= max_depth {
            self.cancel.check("skeleton")?;
            depth_reached = depth;

            let pairs: Vec<(usize, usize)> = (0..n)
                .flat_map(|i| adj[i].iter().filter(move |&&j| j > i).map(move |&j| (i, j)))
                .collect();

            let removed = if self.config.stable {
                let frozen = adj.clone();
                let outcomes: Vec<Option<Sepset>> = if self.config.parallel {
                    pairs
                        .par_iter()
                        .map(|&(x, y)| self.test_pair(variables, &frozen, x, y, depth, &counters))
                        .collect::<PagResult<_>>()?
                } else {
                    pairs
                        .iter()
                        .map(|&(x, y)| self.test_pair(variables, &frozen, x, y, depth, &counters))
                        .collect::<PagResult<_>>()?
                };
                let mut removed = 0;
                for (&(x, y), outcome) in pairs.iter().zip(outcomes) {
                    if let Some(sepset) = outcome {
                        self.remove(&mut adj, &mut sepsets, variables, x, y, sepset, depth);
                        removed += 1;
                    }
                }
                removed
            } else {
                let mut removed = 0;
                for &(x, y) in &pairs {
                    if let Some(sepset) = self.test_pair(variables, &adj, x, y, depth, &counters)? {
                        self.remove(&mut adj, &mut sepsets, variables, x, y, sepset, depth);
                        removed += 1;
                    }
                }
                removed
            };
            debug!(depth, removed, remaining = pairs.len() - removed, "depth complete");

            // Stop once no node has enough other neighbours for a larger set.
            let free_degree = adj.iter().map(|a| a.len().saturating_sub(1)).max().unwrap_or(0);
            if free_degree <= depth {
                break;
            }
            depth += 1;
        }

        let mut graph = Graph::with_observed(variables.iter().cloned())?;
        let ids = graph.nodes();
        for i in 0..n {
            for &j in adj[i].iter().filter(|&&j| j > i) {
                graph.add_edge(ids[i], Endpoint::Tail, ids[j], Endpoint::Tail)?;
            }
        }

        let result = SkeletonResult {
            graph,
            sepsets,
            depth_reached,
            tests_run: counters.tests.load(Ordering::Relaxed),
            timeouts: counters.timeouts.load(Ordering::Relaxed),
            alpha: self.oracle.alpha(),
        };
        info!(
            num_vars = n,
            edges = result.graph.edge_count(),
            depth_reached = result.depth_reached,
            tests_run = result.tests_run,
            timeouts = result.timeouts,
            alpha = result.alpha,
            "skeleton search complete"
        );
        Ok(result)
    }

    /// Look for a separating set of size `depth` for `(x, y)`, first among
    /// the neighbours of `x`, then among those of `y`.
    fn test_pair(
        &self,
        variables: &[String],
        adj: &[BTreeSet<usize>],
        x: usize,
        y: usize,
        depth: usize,
        counters: &Counters,
    ) -> PagResult<Option<Sepset>> {
        if !self.knowledge.no_edge_required(&variables[x], &variables[y]) {
            return Ok(None);
        }
        for (a, b) in [(x, y), (y, x)] {
            let candidates: Vec<usize> = adj[a]
                .iter()
                .copied()
                .filter(|&z| z != b && self.possible_parent_of(&variables[z], &variables[a]))
                .collect();
            if candidates.len() < depth {
                continue;
            }
            for subset in choose(&candidates, depth) {
                let z: Vec<String> = subset.iter().map(|&i| variables[i].clone()).collect();
                counters.tests.fetch_add(1, Ordering::Relaxed);
                let result = match self.oracle.test(&variables[x], &variables[y], &z) {
                    Ok(r) => r,
                    Err(e) if e.is_recoverable() => {
                        counters.timeouts.fetch_add(1, Ordering::Relaxed);
                        warn!(x = %variables[x], y = %variables[y], error = %e, "treating timed-out test as dependent");
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                if result.independent {
                    return Ok(Some(Sepset::new(z, Some(result.p_value))));
                }
            }
        }
        Ok(None)
    }

    /// `z` may condition `x` unless `z --> x` is forbidden or `x --> z` is required.
    fn possible_parent_of(&self, z: &str, x: &str) -> bool {
        !self.knowledge.is_forbidden(z, x) && !self.knowledge.is_required(x, z)
    }

    #[allow(clippy::too_many_arguments)]
    fn remove(
        &self,
        adj: &mut [BTreeSet<usize>],
        sepsets: &mut SepsetMap,
        variables: &[String],
        x: usize,
        y: usize,
        sepset: Sepset,
        depth: usize,
    ) {
        adj[x].remove(&y);
        adj[y].remove(&x);
        debug!(x = %variables[x], y = %variables[y], sepset = ?sepset.nodes, "edge removed");
        sepsets.record_removal(&variables[x], &variables[y], RemovalReason::Sepset, sepset, Some(depth));
    }
}

#[derive(Default)]
struct Counters {
    tests: AtomicUsize,
    timeouts: AtomicUsize,
}
