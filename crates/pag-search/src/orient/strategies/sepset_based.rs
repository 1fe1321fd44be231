use pag_core::config::ColliderStrategyKind;
use pag_core::{Graph, NodeId, PagResult, SepsetMap};

use super::{ColliderDecision, ColliderStrategy};

/// Collider iff `z` is absent from the sepset the skeleton stored for `(x, y)`.
pub struct SepsetBasedStrategy<'a> {
    sepsets: &'a SepsetMap,
}

impl<'a> SepsetBasedStrategy<'a> {
    pub fn new(sepsets: &'a SepsetMap) -> Self {
        Self { sepsets }
    }
}

impl ColliderStrategy for SepsetBasedStrategy<'_> {
    fn kind(&self) -> ColliderStrategyKind {
        ColliderStrategyKind::SepsetBased
    }

    fn decide(&self, graph: &Graph, x: NodeId, z: NodeId, y: NodeId) -> PagResult<ColliderDecision> {
        Ok(from_sepset(self.sepsets, graph, x, z, y))
    }
}

pub(super) fn from_sepset(
    sepsets: &SepsetMap,
    graph: &Graph,
    x: NodeId,
    z: NodeId,
    y: NodeId,
) -> ColliderDecision {
    match sepsets.separates(graph.name(x), graph.name(y), graph.name(z)) {
        Some(true) => ColliderDecision::NonCollider,
        Some(false) => ColliderDecision::Collider,
        None => ColliderDecision::Ambiguous,
    }
}
