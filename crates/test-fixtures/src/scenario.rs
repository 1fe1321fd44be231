//! Golden scenario schema.

use pag_core::{Knowledge, PagResult};
use serde::Deserialize;

use crate::oracles::DagOracle;

/// A true DAG. Latent nodes are hidden from the oracle's variable list.
#[derive(Debug, Clone, Deserialize)]
pub struct DagSpec {
    pub nodes: Vec<String>,
    #[serde(default)]
    pub latents: Vec<String>,
    /// `[from, to]` pairs.
    pub edges: Vec<(String, String)>,
}

impl DagSpec {
    pub fn oracle(&self) -> DagOracle {
        let edges: Vec<(&str, &str)> = self
            .edges
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect();
        let latents: Vec<&str> = self.latents.iter().map(String::as_str).collect();
        DagOracle::with_nodes(&self.nodes, &edges).with_latents(&latents)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeSpec {
    pub forbidden: Vec<(String, String)>,
    pub required: Vec<(String, String)>,
}

impl KnowledgeSpec {
    pub fn build(&self) -> PagResult<Knowledge> {
        let mut k = Knowledge::new();
        for (a, b) in &self.forbidden {
            k.set_forbidden(a, b)?;
        }
        for (a, b) in &self.required {
            k.set_required(a, b)?;
        }
        Ok(k)
    }
}

/// Expected output. Edges are written as `"A o-> B"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Expected {
    pub skeleton: Vec<(String, String)>,
    pub sepsets: Vec<ExpectedSepset>,
    pub pag: Vec<String>,
    /// Directed edges that must not appear, as `[from, to]`.
    pub absent_directed: Vec<(String, String)>,
    pub latent_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedSepset {
    pub x: String,
    pub y: String,
    pub sepset: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dag: DagSpec,
    #[serde(default)]
    pub knowledge: KnowledgeSpec,
    /// TOML passed to `PagConfig::from_toml`; empty means defaults.
    #[serde(default)]
    pub config: String,
    pub expected: Expected,
}
