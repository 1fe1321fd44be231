use pag_core::config::ColliderStrategyKind;
use pag_core::{Graph, GuardedOracle, NodeId, PagResult};

use super::{involves_latent, separating_sets, ColliderDecision, ColliderStrategy};

/// Re-tests the pair and orients only when every separating set agrees on
/// whether it contains the middle node.
pub struct ConservativeStrategy<'a> {
    oracle: &'a GuardedOracle,
    depth: i32,
}

impl<'a> ConservativeStrategy<'a> {
    pub fn new(oracle: &'a GuardedOracle, depth: i32) -> Self {
        Self { oracle, depth }
    }
}

impl ColliderStrategy for ConservativeStrategy<'_> {
    fn kind(&self) -> ColliderStrategyKind {
        ColliderStrategyKind::Conservative
    }

    fn decide(&self, graph: &Graph, x: NodeId, z: NodeId, y: NodeId) -> PagResult<ColliderDecision> {
        if involves_latent(graph, x, z, y) {
            return Ok(ColliderDecision::Ambiguous);
        }
        let sets = separating_sets(self.oracle, graph, x, z, y, self.depth)?;
        if sets.is_empty() {
            return Ok(ColliderDecision::Ambiguous);
        }
        let with_z = sets.iter().filter(|s| s.contains_z).count();
        Ok(if with_z == 0 {
            ColliderDecision::Collider
        } else if with_z == sets.len() {
            ColliderDecision::NonCollider
        } else {
            ColliderDecision::Ambiguous
        })
    }
}
