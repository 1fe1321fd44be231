//! Concurrent per-pair edge-type counts.
//!
//! Pairs are keyed by lexically ordered names and edge types are read in
//! that same order. Only edges that exist are recorded; a pair's `nil`
//! count is the number of recorded runs in which it was absent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use pag_core::graph::EdgeTypeProbability;
use pag_core::{EdgeProperty, EdgeType, Graph};

/// One edge type together with the properties it carried.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Observation {
    pub edge_type: EdgeType,
    pub properties: BTreeSet<EdgeProperty>,
}

impl Observation {
    pub fn nil() -> Self {
        Self {
            edge_type: EdgeType::Nil,
            properties: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EdgeTally {
    counts: DashMap<(String, String), BTreeMap<Observation, usize>>,
    runs: AtomicUsize,
}

impl EdgeTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every edge of one run's graph.
    pub fn record(&self, graph: &Graph) {
        for edge in graph.edges() {
            let observation = Observation {
                edge_type: edge.edge_type(),
                properties: edge.properties.clone(),
            };
            *self
                .counts
                .entry(key(&edge.node1, &edge.node2))
                .or_default()
                .entry(observation)
                .or_insert(0) += 1;
        }
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::Relaxed)
    }

    /// Counts for the pair, `nil` included when the pair was ever absent.
    pub fn counts(&self, a: &str, b: &str) -> BTreeMap<Observation, usize> {
        let mut counts = self
            .counts
            .get(&key(a, b))
            .map(|c| c.value().clone())
            .unwrap_or_default();
        let present: usize = counts.values().sum();
        let absent = self.runs().saturating_sub(present);
        if absent > 0 {
            counts.insert(Observation::nil(), absent);
        }
        counts
    }

    /// Runs in which the pair had this edge type, whatever its properties.
    pub fn type_count(&self, a: &str, b: &str, edge_type: EdgeType) -> usize {
        self.counts(a, b)
            .iter()
            .filter(|(o, _)| o.edge_type == edge_type)
            .map(|(_, &n)| n)
            .sum()
    }

    /// Pairs adjacent in at least one run, sorted.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self.counts.iter().map(|e| e.key().clone()).collect();
        pairs.sort();
        pairs
    }

    /// Frequency of every observation for the pair, in observation order.
    pub fn probabilities(&self, a: &str, b: &str) -> Vec<EdgeTypeProbability> {
        let runs = self.runs();
        if runs == 0 {
            return Vec::new();
        }
        self.counts(a, b)
            .into_iter()
            .map(|(o, n)| EdgeTypeProbability {
                edge_type: o.edge_type,
                properties: o.properties,
                probability: n as f64 / runs as f64,
            })
            .collect()
    }
}

fn key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
