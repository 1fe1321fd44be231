//! Uncovered path search used by the tail rules.
//!
//! A path is uncovered when every consecutive triple on it is unshielded.
//! The searches are depth-first over simple paths; PAGs handled here are
//! small enough that no memoization is needed.

use pag_core::{Endpoint, Graph, NodeId};

/// `u o-o v`.
pub(crate) fn circle_step(graph: &Graph, u: NodeId, v: NodeId) -> bool {
    graph.has_mark(v, u, Endpoint::Circle) && graph.has_mark(u, v, Endpoint::Circle)
}

/// The edge can be read as pointing from `u` to `v`: no arrowhead at `u`
/// and no tail at `v`.
pub(crate) fn potentially_directed_step(graph: &Graph, u: NodeId, v: NodeId) -> bool {
    graph.is_adjacent(u, v)
        && !graph.has_mark(v, u, Endpoint::Arrow)
        && !graph.has_mark(u, v, Endpoint::Tail)
}

/// Constraints on one uncovered path search.
pub(crate) struct PathQuery<'g, S, F, L> {
    pub graph: &'g Graph,
    pub from: NodeId,
    pub to: NodeId,
    /// Shortest acceptable path, in nodes.
    pub min_nodes: usize,
    /// Whether the path may traverse `u` to `v`.
    pub step: S,
    /// Constraint on the node right after `from`.
    pub first_ok: F,
    /// Constraint on the node right before `to`.
    pub last_ok: L,
    /// Nodes the path may not visit.
    pub avoid: &'g [NodeId],
}

impl<S, F, L> PathQuery<'_, S, F, L>
where
    S: Fn(&Graph, NodeId, NodeId) -> bool,
    F: Fn(NodeId) -> bool,
    L: Fn(NodeId) -> bool,
{
    /// First uncovered path satisfying the query, `from` and `to` included.
    pub fn find(&self) -> Option<Vec<NodeId>> {
        let mut path = vec![self.from];
        self.extend(&mut path).then_some(path)
    }

    fn extend(&self, path: &mut Vec<NodeId>) -> bool {
        let Some(&cur) = path.last() else {
            return false;
        };
        let prev = path.len().checked_sub(2).map(|i| path[i]);
        for next in self.graph.adjacent(cur) {
            if path.contains(&next) || self.avoid.contains(&next) {
                continue;
            }
            if path.len() == 1 && !(self.first_ok)(next) {
                continue;
            }
            if !(self.step)(self.graph, cur, next) {
                continue;
            }
            if prev.is_some_and(|p| self.graph.is_adjacent(p, next)) {
                continue;
            }
            if next == self.to {
                if path.len() + 1 >= self.min_nodes && (self.last_ok)(cur) {
                    path.push(next);
                    return true;
                }
                continue;
            }
            path.push(next);
            if self.extend(path) {
                return true;
            }
            path.pop();
        }
        false
    }
}
