//! Collider decisions for unshielded triples (R0) and discriminating
//! paths (R4).

mod conservative;
mod max_p;
mod sepset_based;

use std::collections::BTreeSet;

use tracing::trace;

use pag_core::combinatorics::subsets_up_to;
use pag_core::config::ColliderStrategyKind;
use pag_core::{Graph, GuardedOracle, NodeId, PagResult, SepsetMap};

pub use conservative::ConservativeStrategy;
pub use max_p::MaxPStrategy;
pub use sepset_based::SepsetBasedStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderDecision {
    Collider,
    NonCollider,
    /// Leave the triple unoriented.
    Ambiguous,
}

/// Decide whether `z` is a collider between the nonadjacent `x` and `y`.
pub trait ColliderStrategy {
    fn kind(&self) -> ColliderStrategyKind;

    fn decide(&self, graph: &Graph, x: NodeId, z: NodeId, y: NodeId) -> PagResult<ColliderDecision>;
}

/// Build the strategy named by `kind`. `depth` bounds the conditioning sets
/// the test-based strategies enumerate; -1 means unbounded.
pub fn build<'a>(
    kind: ColliderStrategyKind,
    oracle: &'a GuardedOracle,
    sepsets: &'a SepsetMap,
    depth: i32,
) -> Box<dyn ColliderStrategy + 'a> {
    match kind {
        ColliderStrategyKind::SepsetBased => Box::new(SepsetBasedStrategy::new(sepsets)),
        ColliderStrategyKind::Conservative => Box::new(ConservativeStrategy::new(oracle, depth)),
        ColliderStrategyKind::MaxP => Box::new(MaxPStrategy::new(oracle, sepsets, depth)),
    }
}

/// One conditioning set under which `x` and `y` tested independent.
#[derive(Debug, Clone)]
pub(crate) struct SeparatingSet {
    pub contains_z: bool,
    pub p_value: f64,
}

/// Test `x` and `y` against every subset of the observed neighbours of
/// either endpoint, up to `depth` elements, and return the sets that
/// separate them. Timed-out tests count as dependent.
pub(crate) fn separating_sets(
    oracle: &GuardedOracle,
    graph: &Graph,
    x: NodeId,
    z: NodeId,
    y: NodeId,
    depth: i32,
) -> PagResult<Vec<SeparatingSet>> {
    let (xn, yn, zn) = (graph.name(x), graph.name(y), graph.name(z));
    let pool = |a: NodeId, b: NodeId| -> Vec<String> {
        let mut names: Vec<String> = graph
            .adjacent(a)
            .into_iter()
            .filter(|&n| n != b && !graph.is_latent(n))
            .map(|n| graph.name(n).to_string())
            .collect();
        names.sort();
        names
    };
    let pools = [pool(x, y), pool(y, x)];
    let widest = pools.iter().map(Vec::len).max().unwrap_or(0);
    let max = usize::try_from(depth).map_or(widest, |d| d.min(widest));

    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut found = Vec::new();
    for pool in &pools {
        for subset in subsets_up_to(pool, 0, max) {
            if !seen.insert(subset.clone()) {
                continue;
            }
            let result = oracle.test_or_dependent(xn, yn, &subset)?;
            trace!(x = xn, y = yn, z = ?subset, independent = result.independent, "collider test");
            if result.independent {
                found.push(SeparatingSet {
                    contains_z: subset.iter().any(|s| s == zn),
                    p_value: result.p_value,
                });
            }
        }
    }
    Ok(found)
}

/// Latent endpoints have no data behind them.
pub(crate) fn involves_latent(graph: &Graph, x: NodeId, z: NodeId, y: NodeId) -> bool {
    graph.is_latent(x) || graph.is_latent(z) || graph.is_latent(y)
}
