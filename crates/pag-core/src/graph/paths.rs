//! Directed reachability and cycle detection over the `-->` edges of a
//! graph, plus the semidirected and visibility queries used by edge markup.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;

use super::{Endpoint, Graph, NodeId};

/// Nodes reachable from `from` by a directed path of length at least one.
/// `from` is included only if it lies on a directed cycle.
pub fn directed_reachable(graph: &Graph, from: NodeId) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    let mut queue: VecDeque<NodeId> = graph.children(from).into();
    while let Some(n) = queue.pop_front() {
        if seen.insert(n) {
            queue.extend(graph.children(n));
        }
    }
    seen
}

/// Every ancestor of any node in `targets`, the targets included.
pub fn ancestors(graph: &Graph, targets: &[NodeId]) -> HashSet<NodeId> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = targets.iter().copied().collect();
    while let Some(n) = queue.pop_front() {
        if seen.insert(n) {
            queue.extend(graph.parents(n));
        }
    }
    seen
}

/// Whether committing `a --> b` would close a directed cycle.
pub fn would_create_cycle(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    a == b || directed_reachable(graph, b).contains(&a)
}

/// Strongly connected components of the directed subgraph with more than
/// one node, each sorted in graph insertion order.
pub fn directed_cycles(graph: &Graph) -> Vec<Vec<NodeId>> {
    let nodes = graph.nodes();
    let mut projected: DiGraph<NodeId, ()> = DiGraph::with_capacity(nodes.len(), 0);
    let mut slot = HashMap::with_capacity(nodes.len());
    for &n in &nodes {
        slot.insert(n, projected.add_node(n));
    }
    for &n in &nodes {
        for c in graph.children(n) {
            projected.add_edge(slot[&n], slot[&c], ());
        }
    }

    let order: HashMap<NodeId, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&projected)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut ids: Vec<NodeId> = scc.into_iter().map(|i| projected[i]).collect();
            ids.sort_by_key(|id| order[id]);
            ids
        })
        .collect();
    cycles.sort_by_key(|c| order[&c[0]]);
    cycles
}

/// Whether the directed edges of the graph contain no cycle.
pub fn is_acyclic(graph: &Graph) -> bool {
    directed_cycles(graph).is_empty()
}

/// Whether a semidirected path leads from `from` to `to`. Each step leaves
/// its node through a tail or a circle. The edge `skip`, if given, is not
/// walked in either direction.
pub fn exists_semidirected_path(
    graph: &Graph,
    from: NodeId,
    to: NodeId,
    skip: Option<(NodeId, NodeId)>,
) -> bool {
    let skipped = |a: NodeId, b: NodeId| skip.is_some_and(|(x, y)| (x, y) == (a, b) || (x, y) == (b, a));
    let step = |t: NodeId| -> Vec<NodeId> {
        graph
            .adjacent(t)
            .into_iter()
            .filter(|&u| !skipped(t, u))
            .filter(|&u| matches!(graph.endpoint(u, t), Some(Endpoint::Tail | Endpoint::Circle)))
            .collect()
    };

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for u in step(from) {
        if seen.insert(u) {
            queue.push_back(u);
        }
    }
    while let Some(t) = queue.pop_front() {
        if t == to {
            return true;
        }
        for u in step(t) {
            if seen.insert(u) {
                queue.push_back(u);
            }
        }
    }
    false
}

/// Whether `a --> b` is definitely visible: some `c` nonadjacent to `b`
/// has an arrowhead into `a`, either directly or through a collider path
/// whose interior nodes are all parents of `b`.
pub fn is_definitely_visible(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    if !graph.is_parent_of(a, b) {
        return false;
    }
    graph.nodes().into_iter().any(|c| {
        if c == a || c == b || graph.is_adjacent(c, b) {
            return false;
        }
        if graph.has_mark(c, a, Endpoint::Arrow) {
            return true;
        }
        collider_path_into(graph, None, c, a, b, &mut HashSet::new())
    })
}

fn collider_path_into(
    graph: &Graph,
    prev: Option<NodeId>,
    cur: NodeId,
    a: NodeId,
    b: NodeId,
    on_branch: &mut HashSet<NodeId>,
) -> bool {
    if cur == a {
        return prev.is_some_and(|p| graph.has_mark(p, a, Endpoint::Arrow));
    }
    if prev.is_some() && !graph.is_parent_of(cur, b) {
        return false;
    }
    on_branch.insert(cur);
    for next in graph.adjacent(cur) {
        if on_branch.contains(&next) {
            continue;
        }
        let extends = match prev {
            None => true,
            Some(p) => graph.is_def_collider(p, cur, next),
        };
        if extends && collider_path_into(graph, Some(cur), next, a, b, on_branch) {
            return true;
        }
    }
    on_branch.remove(&cur);
    false
}
