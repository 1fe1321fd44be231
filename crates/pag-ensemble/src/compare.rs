//! Compare an estimated graph against a reference over every node pair.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use pag_core::{EdgeType, Graph};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdjacencyConfusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl AdjacencyConfusion {
    /// `None` when the estimate has no adjacencies.
    pub fn precision(&self) -> Option<f64> {
        let predicted = self.true_positives + self.false_positives;
        (predicted > 0).then(|| self.true_positives as f64 / predicted as f64)
    }

    /// `None` when the reference has no adjacencies.
    pub fn recall(&self) -> Option<f64> {
        let actual = self.true_positives + self.false_negatives;
        (actual > 0).then(|| self.true_positives as f64 / actual as f64)
    }
}

/// Counts keyed by `(reference type, estimated type)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgeTypeConfusion {
    pub counts: BTreeMap<(EdgeType, EdgeType), usize>,
}

impl EdgeTypeConfusion {
    pub fn get(&self, reference: EdgeType, estimate: EdgeType) -> usize {
        self.counts.get(&(reference, estimate)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Share of pairs whose type matches, `nil`/`nil` included.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        let hits: usize = self
            .counts
            .iter()
            .filter(|((r, e), _)| r == e)
            .map(|(_, &n)| n)
            .sum();
        (total > 0).then(|| hits as f64 / total as f64)
    }
}

pub fn adjacency_confusion(reference: &Graph, estimate: &Graph) -> AdjacencyConfusion {
    let mut out = AdjacencyConfusion::default();
    for (a, b) in pairs(reference, estimate) {
        match (adjacent(reference, &a, &b), adjacent(estimate, &a, &b)) {
            (true, true) => out.true_positives += 1,
            (false, true) => out.false_positives += 1,
            (true, false) => out.false_negatives += 1,
            (false, false) => out.true_negatives += 1,
        }
    }
    out
}

pub fn edge_type_confusion(reference: &Graph, estimate: &Graph) -> EdgeTypeConfusion {
    let mut out = EdgeTypeConfusion::default();
    for (a, b) in pairs(reference, estimate) {
        let key = (edge_type(reference, &a, &b), edge_type(estimate, &a, &b));
        *out.counts.entry(key).or_insert(0) += 1;
    }
    out
}

/// Lexically ordered pairs over the union of both graphs' node names.
fn pairs(g1: &Graph, g2: &Graph) -> Vec<(String, String)> {
    let names: BTreeSet<String> = g1.node_names().into_iter().chain(g2.node_names()).collect();
    let names: Vec<String> = names.into_iter().collect();
    let mut out = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            out.push((a.clone(), b.clone()));
        }
    }
    out
}

fn adjacent(g: &Graph, a: &str, b: &str) -> bool {
    g.edge_by_name(a, b).is_some()
}

fn edge_type(g: &Graph, a: &str, b: &str) -> EdgeType {
    g.edge_by_name(a, b).map(|e| e.edge_type()).unwrap_or(EdgeType::Nil)
}
