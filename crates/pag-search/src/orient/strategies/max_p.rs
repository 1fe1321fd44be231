use pag_core::config::ColliderStrategyKind;
use pag_core::{Graph, GuardedOracle, NodeId, PagResult, SepsetMap};

use super::sepset_based::from_sepset;
use super::{involves_latent, separating_sets, ColliderDecision, ColliderStrategy};

/// Trusts the separating set with the highest p-value. Ties go to the
/// collider side. With no separating set at all, falls back to the stored
/// sepset.
pub struct MaxPStrategy<'a> {
    oracle: &'a GuardedOracle,
    sepsets: &'a SepsetMap,
    depth: i32,
}

impl<'a> MaxPStrategy<'a> {
    pub fn new(oracle: &'a GuardedOracle, sepsets: &'a SepsetMap, depth: i32) -> Self {
        Self {
            oracle,
            sepsets,
            depth,
        }
    }
}

impl ColliderStrategy for MaxPStrategy<'_> {
    fn kind(&self) -> ColliderStrategyKind {
        ColliderStrategyKind::MaxP
    }

    fn decide(&self, graph: &Graph, x: NodeId, z: NodeId, y: NodeId) -> PagResult<ColliderDecision> {
        if involves_latent(graph, x, z, y) {
            return Ok(from_sepset(self.sepsets, graph, x, z, y));
        }
        let sets = separating_sets(self.oracle, graph, x, z, y, self.depth)?;
        let best = |with_z: bool| {
            sets.iter()
                .filter(|s| s.contains_z == with_z)
                .map(|s| s.p_value)
                .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
        };
        Ok(match (best(false), best(true)) {
            (None, None) => from_sepset(self.sepsets, graph, x, z, y),
            (Some(_), None) => ColliderDecision::Collider,
            (None, Some(_)) => ColliderDecision::NonCollider,
            (Some(excl), Some(incl)) if excl >= incl => ColliderDecision::Collider,
            (Some(_), Some(_)) => ColliderDecision::NonCollider,
        })
    }
}
