//! Graph nodes.

use serde::{Deserialize, Serialize};

/// Whether a variable was measured or introduced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Observed,
    Latent,
}

/// A variable in the graph. The name is its identity within one graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    /// Layout hint only; the engine never reads it.
    #[serde(default)]
    pub position: (f64, f64),
}

impl Node {
    pub fn observed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Observed,
            position: (0.0, 0.0),
        }
    }

    pub fn latent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Latent,
            position: (0.0, 0.0),
        }
    }

    pub fn is_latent(&self) -> bool {
        self.kind == NodeKind::Latent
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
