//! Graph Store: nodes plus edges carrying an endpoint mark at each end.
//!
//! Wraps a petgraph `StableUnGraph` with a name index. Neighbour and edge
//! listings follow node insertion order so every traversal is deterministic.

mod edge;
mod endpoint;
mod node;
pub mod paths;

use std::collections::{BTreeSet, HashMap};

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;

use crate::errors::{GraphError, PagResult};

pub use edge::{Edge, EdgeType, EdgeTypeProbability};
pub use endpoint::{EdgeProperty, Endpoint};
pub use node::{Node, NodeKind};

/// Stable handle to a node. Survives removal of other nodes.
pub type NodeId = NodeIndex;

/// Edge weight: the node the edge was created from, the marks at each end,
/// and annotations.
#[derive(Debug, Clone)]
struct EdgeMarks {
    first: NodeIndex,
    at_first: Endpoint,
    at_second: Endpoint,
    properties: BTreeSet<EdgeProperty>,
    probabilities: Vec<EdgeTypeProbability>,
}

impl EdgeMarks {
    fn mark_at(&self, node: NodeIndex) -> Endpoint {
        if node == self.first {
            self.at_first
        } else {
            self.at_second
        }
    }

    fn set_mark_at(&mut self, node: NodeIndex, mark: Endpoint) {
        if node == self.first {
            self.at_first = mark;
        } else {
            self.at_second = mark;
        }
    }
}

/// Mixed graph with endpoint marks.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: StableUnGraph<Node, EdgeMarks>,
    index: HashMap<String, NodeIndex>,
    rank: HashMap<NodeIndex, u64>,
    next_rank: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with one observed node per name and no edges.
    pub fn with_observed<I, S>(names: I) -> PagResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for name in names {
            graph.add_node(Node::observed(name))?;
        }
        Ok(graph)
    }

    /// Complete graph over `names` with every edge `o-o`.
    pub fn complete_circle<I, S>(names: I) -> PagResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::with_observed(names)?;
        let nodes = graph.nodes();
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                graph.add_edge(a, Endpoint::Circle, b, Endpoint::Circle)?;
            }
        }
        Ok(graph)
    }

    // ---- nodes ----

    pub fn add_node(&mut self, node: Node) -> PagResult<NodeId> {
        if self.index.contains_key(&node.name) {
            return Err(GraphError::DuplicateNode { name: node.name }.into());
        }
        let name = node.name.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(name, idx);
        self.rank.insert(idx, self.next_rank);
        self.next_rank += 1;
        Ok(idx)
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.inner.remove_node(id)?;
        self.index.remove(&node.name);
        self.rank.remove(&id);
        Some(node)
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Like [`Graph::id`] but reports a missing node as an error.
    pub fn require(&self, name: &str) -> PagResult<NodeId> {
        self.id(name).ok_or_else(|| {
            GraphError::NodeNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.node_weight(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.inner.node_weight_mut(id)
    }

    /// Name of a node. Panics if `id` does not belong to this graph.
    pub fn name(&self, id: NodeId) -> &str {
        &self.inner[id].name
    }

    pub fn is_latent(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_latent)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.inner.node_indices().collect();
        self.sort_by_rank(&mut ids);
        ids
    }

    pub fn node_names(&self) -> Vec<String> {
        self.nodes()
            .into_iter()
            .map(|id| self.name(id).to_string())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    fn sort_by_rank(&self, ids: &mut [NodeId]) {
        ids.sort_by_key(|id| self.rank.get(id).copied().unwrap_or(u64::MAX));
    }

    // ---- edges ----

    /// Add an edge with `mark_a` at `a` and `mark_b` at `b`.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        mark_a: Endpoint,
        b: NodeId,
        mark_b: Endpoint,
    ) -> PagResult<()> {
        self.check_node(a)?;
        self.check_node(b)?;
        if a == b {
            return Err(GraphError::SelfLoop {
                name: self.name(a).to_string(),
            }
            .into());
        }
        if self.inner.find_edge(a, b).is_some() {
            return Err(GraphError::DuplicateEdge {
                node1: self.name(a).to_string(),
                node2: self.name(b).to_string(),
            }
            .into());
        }
        self.inner.add_edge(
            a,
            b,
            EdgeMarks {
                first: a,
                at_first: mark_a,
                at_second: mark_b,
                properties: BTreeSet::new(),
                probabilities: Vec::new(),
            },
        );
        Ok(())
    }

    /// `a --> b`.
    pub fn add_directed_edge(&mut self, a: NodeId, b: NodeId) -> PagResult<()> {
        self.add_edge(a, Endpoint::Tail, b, Endpoint::Arrow)
    }

    /// `a <-> b`.
    pub fn add_bidirected_edge(&mut self, a: NodeId, b: NodeId) -> PagResult<()> {
        self.add_edge(a, Endpoint::Arrow, b, Endpoint::Arrow)
    }

    /// `a o-o b`.
    pub fn add_nondirected_edge(&mut self, a: NodeId, b: NodeId) -> PagResult<()> {
        self.add_edge(a, Endpoint::Circle, b, Endpoint::Circle)
    }

    /// `a o-> b`.
    pub fn add_partially_oriented_edge(&mut self, a: NodeId, b: NodeId) -> PagResult<()> {
        self.add_edge(a, Endpoint::Circle, b, Endpoint::Arrow)
    }

    /// Add an edge described by names, creating missing observed nodes.
    pub fn add_edge_by_name(
        &mut self,
        a: &str,
        mark_a: Endpoint,
        b: &str,
        mark_b: Endpoint,
    ) -> PagResult<()> {
        let ia = self.ensure_observed(a)?;
        let ib = self.ensure_observed(b)?;
        self.add_edge(ia, mark_a, ib, mark_b)
    }

    fn ensure_observed(&mut self, name: &str) -> PagResult<NodeId> {
        match self.id(name) {
            Some(id) => Ok(id),
            None => self.add_node(Node::observed(name)),
        }
    }

    /// Remove the edge between `a` and `b`. Returns whether one existed.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        match self.inner.find_edge(a, b) {
            Some(e) => self.inner.remove_edge(e).is_some(),
            None => false,
        }
    }

    pub fn is_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.inner.find_edge(a, b).is_some()
    }

    /// Mark at `b` on the edge between `a` and `b`.
    pub fn endpoint(&self, a: NodeId, b: NodeId) -> Option<Endpoint> {
        let e = self.inner.find_edge(a, b)?;
        self.inner.edge_weight(e).map(|w| w.mark_at(b))
    }

    /// Whether the edge `a *-* b` exists with `mark` at `b`.
    pub fn has_mark(&self, a: NodeId, b: NodeId, mark: Endpoint) -> bool {
        self.endpoint(a, b) == Some(mark)
    }

    /// Overwrite the mark at `b` on the edge between `a` and `b`.
    pub fn set_endpoint(&mut self, a: NodeId, b: NodeId, mark: Endpoint) -> PagResult<()> {
        let e = self.find_edge_or_err(a, b)?;
        if let Some(w) = self.inner.edge_weight_mut(e) {
            w.set_mark_at(b, mark);
        }
        Ok(())
    }

    /// Set the marks at both ends.
    pub fn set_marks(
        &mut self,
        a: NodeId,
        mark_a: Endpoint,
        b: NodeId,
        mark_b: Endpoint,
    ) -> PagResult<()> {
        self.set_endpoint(b, a, mark_a)?;
        self.set_endpoint(a, b, mark_b)
    }

    /// Set every mark in the graph to `mark`.
    pub fn reorient_all_with(&mut self, mark: Endpoint) {
        for w in self.inner.edge_weights_mut() {
            w.at_first = mark;
            w.at_second = mark;
        }
    }

    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<Edge> {
        let e = self.inner.find_edge(a, b)?;
        Some(self.snapshot(e, a, b))
    }

    pub fn edge_by_name(&self, a: &str, b: &str) -> Option<Edge> {
        self.edge(self.id(a)?, self.id(b)?)
    }

    fn snapshot(&self, e: EdgeIndex, a: NodeId, b: NodeId) -> Edge {
        let w = &self.inner[e];
        Edge {
            node1: self.name(a).to_string(),
            node2: self.name(b).to_string(),
            endpoint1: w.mark_at(a),
            endpoint2: w.mark_at(b),
            properties: w.properties.clone(),
            probabilities: w.probabilities.clone(),
        }
    }

    /// Adjacent node pairs, each reported once with the earlier-inserted node first.
    pub fn edge_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::with_capacity(self.edge_count());
        for a in self.nodes() {
            for b in self.adjacent(a) {
                if self.rank[&a] < self.rank[&b] {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Snapshots of every edge in [`Graph::edge_pairs`] order.
    pub fn edges(&self) -> Vec<Edge> {
        self.edge_pairs()
            .into_iter()
            .filter_map(|(a, b)| self.edge(a, b))
            .collect()
    }

    pub fn add_edge_property(&mut self, a: NodeId, b: NodeId, property: EdgeProperty) -> PagResult<()> {
        let e = self.find_edge_or_err(a, b)?;
        if let Some(w) = self.inner.edge_weight_mut(e) {
            w.properties.insert(property);
        }
        Ok(())
    }

    pub fn clear_edge_properties(&mut self, a: NodeId, b: NodeId) -> PagResult<()> {
        let e = self.find_edge_or_err(a, b)?;
        if let Some(w) = self.inner.edge_weight_mut(e) {
            w.properties.clear();
        }
        Ok(())
    }

    pub fn set_edge_probabilities(
        &mut self,
        a: NodeId,
        b: NodeId,
        probabilities: Vec<EdgeTypeProbability>,
    ) -> PagResult<()> {
        let e = self.find_edge_or_err(a, b)?;
        if let Some(w) = self.inner.edge_weight_mut(e) {
            w.probabilities = probabilities;
        }
        Ok(())
    }

    fn find_edge_or_err(&self, a: NodeId, b: NodeId) -> PagResult<EdgeIndex> {
        self.inner.find_edge(a, b).ok_or_else(|| {
            GraphError::EdgeNotFound {
                node1: self.node(a).map(|n| n.name.clone()).unwrap_or_default(),
                node2: self.node(b).map(|n| n.name.clone()).unwrap_or_default(),
            }
            .into()
        })
    }

    fn check_node(&self, id: NodeId) -> PagResult<()> {
        if self.inner.contains_node(id) {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound {
                name: format!("#{}", id.index()),
            }
            .into())
        }
    }

    // ---- neighbourhoods ----

    /// Nodes adjacent to `n`, in insertion order.
    pub fn adjacent(&self, n: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.inner.edges(n).map(|e| other(&e, n)).collect();
        self.sort_by_rank(&mut out);
        out
    }

    pub fn degree(&self, n: NodeId) -> usize {
        self.inner.edges(n).count()
    }

    /// Nodes `x` adjacent to `n` whose edge carries `mark` at `n`.
    pub fn nodes_into(&self, n: NodeId, mark: Endpoint) -> Vec<NodeId> {
        self.adjacent(n)
            .into_iter()
            .filter(|&x| self.has_mark(x, n, mark))
            .collect()
    }

    /// Nodes `x` adjacent to `n` whose edge carries `mark` at `x`.
    pub fn nodes_out_of(&self, n: NodeId, mark: Endpoint) -> Vec<NodeId> {
        self.adjacent(n)
            .into_iter()
            .filter(|&x| self.has_mark(n, x, mark))
            .collect()
    }

    /// `a --> b`.
    pub fn is_parent_of(&self, a: NodeId, b: NodeId) -> bool {
        self.has_mark(b, a, Endpoint::Tail) && self.has_mark(a, b, Endpoint::Arrow)
    }

    /// Nodes `c` with `n --> c`.
    pub fn children(&self, n: NodeId) -> Vec<NodeId> {
        self.adjacent(n)
            .into_iter()
            .filter(|&c| self.is_parent_of(n, c))
            .collect()
    }

    /// Nodes `p` with `p --> n`.
    pub fn parents(&self, n: NodeId) -> Vec<NodeId> {
        self.adjacent(n)
            .into_iter()
            .filter(|&p| self.is_parent_of(p, n))
            .collect()
    }

    /// `a *-> b <-* c`.
    pub fn is_def_collider(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.has_mark(a, b, Endpoint::Arrow) && self.has_mark(c, b, Endpoint::Arrow)
    }

    /// `a *-- b --* c`, or `b` has a tail toward either side.
    pub fn is_def_noncollider(&self, a: NodeId, b: NodeId, c: NodeId) -> bool {
        self.has_mark(a, b, Endpoint::Tail) || self.has_mark(c, b, Endpoint::Tail)
    }

    /// Whether `a` is an ancestor of `b` along directed edges. A node is its
    /// own ancestor.
    pub fn is_ancestor_of(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.exists_directed_path(a, b)
    }

    /// Whether a directed path of length at least one runs from `a` to `b`.
    pub fn exists_directed_path(&self, a: NodeId, b: NodeId) -> bool {
        paths::directed_reachable(self, a).contains(&b)
    }

    /// Structural equality: same node names and kinds, same marks and
    /// properties on every edge. Ensemble probabilities are ignored.
    pub fn same_structure(&self, other: &Graph) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        for id in self.nodes() {
            let node = &self.inner[id];
            match other.id(&node.name).and_then(|o| other.node(o)) {
                Some(o) if o.kind == node.kind => {}
                _ => return false,
            }
        }
        self.edges().into_iter().all(|e| {
            match other.edge_by_name(&e.node1, &e.node2) {
                Some(o) => {
                    o.endpoint1 == e.endpoint1
                        && o.endpoint2 == e.endpoint2
                        && o.properties == e.properties
                }
                None => false,
            }
        })
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.same_structure(other)
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Nodes:")?;
        writeln!(f, "{}", self.node_names().join(";"))?;
        writeln!(f)?;
        writeln!(f, "Graph Edges:")?;
        for (i, e) in self.edges().iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, e)?;
        }
        Ok(())
    }
}

fn other<E: EdgeRef<NodeId = NodeIndex>>(e: &E, n: NodeIndex) -> NodeIndex {
    if e.source() == n {
        e.target()
    } else {
        e.source()
    }
}
