//! Edge snapshots and ensemble edge types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::endpoint::{EdgeProperty, Endpoint};

/// Normalized edge classification, read from the lexically smaller node to
/// the larger one. `Ta` is `a --> b`, `At` is `a <-- b`, and so on.
/// `Nil` records absence of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Nil,
    Ta,
    At,
    Ca,
    Ac,
    Cc,
    Aa,
    Tt,
    Tc,
    Ct,
}

impl EdgeType {
    /// Classify the marks `(at first node, at second node)`.
    pub fn from_marks(first: Endpoint, second: Endpoint) -> Self {
        use Endpoint::*;
        match (first, second) {
            (Tail, Arrow) => Self::Ta,
            (Arrow, Tail) => Self::At,
            (Circle, Arrow) => Self::Ca,
            (Arrow, Circle) => Self::Ac,
            (Circle, Circle) => Self::Cc,
            (Arrow, Arrow) => Self::Aa,
            (Tail, Tail) => Self::Tt,
            (Tail, Circle) => Self::Tc,
            (Circle, Tail) => Self::Ct,
        }
    }

    /// The marks `(at first node, at second node)`, or `None` for `Nil`.
    pub fn marks(&self) -> Option<(Endpoint, Endpoint)> {
        use Endpoint::*;
        Some(match self {
            Self::Nil => return None,
            Self::Ta => (Tail, Arrow),
            Self::At => (Arrow, Tail),
            Self::Ca => (Circle, Arrow),
            Self::Ac => (Arrow, Circle),
            Self::Cc => (Circle, Circle),
            Self::Aa => (Arrow, Arrow),
            Self::Tt => (Tail, Tail),
            Self::Tc => (Tail, Circle),
            Self::Ct => (Circle, Tail),
        })
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Ta => "ta",
            Self::At => "at",
            Self::Ca => "ca",
            Self::Ac => "ac",
            Self::Cc => "cc",
            Self::Aa => "aa",
            Self::Tt => "tt",
            Self::Tc => "tc",
            Self::Ct => "ct",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frequency of one edge type (with its properties) across ensemble runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTypeProbability {
    pub edge_type: EdgeType,
    #[serde(default)]
    pub properties: BTreeSet<EdgeProperty>,
    pub probability: f64,
}

/// Owned view of one edge. `endpoint1` is the mark at `node1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub node1: String,
    pub node2: String,
    pub endpoint1: Endpoint,
    pub endpoint2: Endpoint,
    #[serde(default)]
    pub properties: BTreeSet<EdgeProperty>,
    #[serde(default)]
    pub probabilities: Vec<EdgeTypeProbability>,
}

impl Edge {
    pub fn new(
        node1: impl Into<String>,
        endpoint1: Endpoint,
        node2: impl Into<String>,
        endpoint2: Endpoint,
    ) -> Self {
        Self {
            node1: node1.into(),
            node2: node2.into(),
            endpoint1,
            endpoint2,
            properties: BTreeSet::new(),
            probabilities: Vec::new(),
        }
    }

    /// Same edge with the node order swapped.
    pub fn reversed(&self) -> Self {
        Self {
            node1: self.node2.clone(),
            node2: self.node1.clone(),
            endpoint1: self.endpoint2,
            endpoint2: self.endpoint1,
            properties: self.properties.clone(),
            probabilities: self.probabilities.clone(),
        }
    }

    /// Same edge with `node1` lexically before `node2`.
    pub fn normalized(&self) -> Self {
        if self.node1 <= self.node2 {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Mark at `node`, if the node is an endpoint of this edge.
    pub fn endpoint_at(&self, node: &str) -> Option<Endpoint> {
        if node == self.node1 {
            Some(self.endpoint1)
        } else if node == self.node2 {
            Some(self.endpoint2)
        } else {
            None
        }
    }

    pub fn edge_type(&self) -> EdgeType {
        let n = self.normalized();
        EdgeType::from_marks(n.endpoint1, n.endpoint2)
    }

    /// `a --> b` in either direction.
    pub fn is_directed(&self) -> bool {
        matches!(
            (self.endpoint1, self.endpoint2),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    pub fn is_bidirected(&self) -> bool {
        self.endpoint1 == Endpoint::Arrow && self.endpoint2 == Endpoint::Arrow
    }

    pub fn is_undirected(&self) -> bool {
        self.endpoint1 == Endpoint::Tail && self.endpoint2 == Endpoint::Tail
    }

    /// `a o-o b`.
    pub fn is_nondirected(&self) -> bool {
        self.endpoint1 == Endpoint::Circle && self.endpoint2 == Endpoint::Circle
    }

    /// `a o-> b` in either direction.
    pub fn is_partially_oriented(&self) -> bool {
        matches!(
            (self.endpoint1, self.endpoint2),
            (Endpoint::Circle, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Circle)
        )
    }

    pub fn has_circle(&self) -> bool {
        self.endpoint1 == Endpoint::Circle || self.endpoint2 == Endpoint::Circle
    }

    /// For a directed edge, `(tail, head)`.
    pub fn direction(&self) -> Option<(&str, &str)> {
        match (self.endpoint1, self.endpoint2) {
            (Endpoint::Tail, Endpoint::Arrow) => Some((&self.node1, &self.node2)),
            (Endpoint::Arrow, Endpoint::Tail) => Some((&self.node2, &self.node1)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}-{} {}",
            self.node1,
            self.endpoint1.left_glyph(),
            self.endpoint2.right_glyph(),
            self.node2
        )?;
        for p in &self.properties {
            write!(f, " {p}")?;
        }
        Ok(())
    }
}
