//! Latent introduction over an oriented graph.
//!
//! Each observed node, in name order, seeds a search for a block of
//! parents `P` and children `C` such that every `p -> c` is possible and
//! the children stay pairwise dependent given the parents. A confirmed
//! block is replaced by a fresh latent `P -> L -> C`, and the graph is
//! re-completed before the next seed. Once every seed is done, latents are
//! arranged into a hierarchy by parent-set inclusion.

mod block;
mod hierarchy;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use pag_core::config::LatentConfig;
use pag_core::{Cancellable, CancellationToken, Endpoint, Graph, GuardedOracle, Node, NodeId, PagResult};

use crate::orient::{OrientationEngine, OrientationReport};

pub use block::Block;
pub use hierarchy::arrange as arrange_hierarchy;

/// A latent and the observed blocks it was introduced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatentBlock {
    pub latent: String,
    /// Parents at introduction, sorted by name.
    pub parents: Vec<String>,
    /// Children at introduction, sorted by name.
    pub children: Vec<String>,
}

/// Parent set ↦ latent, in introduction order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatentMap {
    blocks: Vec<LatentBlock>,
    by_parents: BTreeMap<Vec<String>, String>,
}

impl LatentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block: LatentBlock) {
        self.by_parents
            .insert(block.parents.clone(), block.latent.clone());
        self.blocks.push(block);
    }

    /// Latent introduced for exactly this parent set, in any order.
    pub fn latent_for<S: AsRef<str>>(&self, parents: &[S]) -> Option<&str> {
        let mut key: Vec<String> = parents.iter().map(|p| p.as_ref().to_string()).collect();
        key.sort();
        self.by_parents.get(&key).map(String::as_str)
    }

    pub fn block(&self, latent: &str) -> Option<&LatentBlock> {
        self.blocks.iter().find(|b| b.latent == latent)
    }

    pub fn blocks(&self) -> &[LatentBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LatentResult {
    pub latents: LatentMap,
    /// `(from, to)` latent edges `from -> to` added by the hierarchy step.
    pub hierarchy: Vec<(String, String)>,
    /// Rule activity from the re-completions after each insertion.
    pub report: Option<OrientationReport>,
    pub tests_run: usize,
}

pub struct LatentIntroducer<'a> {
    oracle: &'a GuardedOracle,
    engine: &'a OrientationEngine<'a>,
    config: LatentConfig,
    cancel: CancellationToken,
}

impl<'a> LatentIntroducer<'a> {
    pub fn new(oracle: &'a GuardedOracle, engine: &'a OrientationEngine<'a>) -> Self {
        Self {
            oracle,
            engine,
            config: LatentConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: LatentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn introduce(&self, graph: &mut Graph) -> PagResult<LatentResult> {
        let _span = pag_core::latent_span!(self.config.check).entered();
        let mut seeds: Vec<String> = graph
            .nodes()
            .into_iter()
            .filter(|&n| !graph.is_latent(n))
            .map(|n| graph.name(n).to_string())
            .collect();
        seeds.sort();

        let mut finder = block::BlockFinder::new(self.oracle, self.engine.knowledge(), &self.config);
        let mut latents = LatentMap::new();
        let mut report: Option<OrientationReport> = None;

        for seed in &seeds {
            self.cancel.check("latent")?;
            let Some(x) = graph.id(seed) else {
                continue;
            };
            let Some(found) = finder.best_block(graph, x)? else {
                continue;
            };
            let latent = self.insert_latent(graph, &found, latents.len())?;
            debug!(
                seed = %seed,
                latent = %latent,
                parents = ?found.parents,
                children = ?found.children,
                "latent introduced"
            );
            latents.insert(LatentBlock {
                latent,
                parents: found.parents,
                children: found.children,
            });
            let completion = self.engine.complete(graph)?;
            match report.as_mut() {
                Some(r) => r.absorb(completion),
                None => report = Some(completion),
            }
        }

        let hierarchy = hierarchy::arrange(graph, &latents)?;
        position_latents(graph, &latents);

        info!(
            latents = latents.len(),
            hierarchy_edges = hierarchy.len(),
            tests_run = finder.tests_run(),
            "latent introduction complete"
        );
        Ok(LatentResult {
            latents,
            hierarchy,
            report,
            tests_run: finder.tests_run(),
        })
    }

    /// Replace every `p -> c` of the block by `p -> L -> c`.
    fn insert_latent(&self, graph: &mut Graph, found: &Block, existing: usize) -> PagResult<String> {
        let mut n = existing + 1;
        let name = loop {
            let candidate = format!("{}{n}", self.config.latent_prefix);
            if !graph.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        let l = graph.add_node(Node::latent(name.clone()))?;
        let parents = ids(graph, &found.parents)?;
        let children = ids(graph, &found.children)?;
        for &p in &parents {
            for &c in &children {
                graph.remove_edge(p, c);
            }
        }
        for &p in &parents {
            graph.add_edge(p, Endpoint::Tail, l, Endpoint::Arrow)?;
        }
        for &c in &children {
            graph.add_edge(l, Endpoint::Tail, c, Endpoint::Arrow)?;
        }
        Ok(name)
    }
}

fn ids(graph: &Graph, names: &[String]) -> PagResult<Vec<NodeId>> {
    names.iter().map(|n| graph.require(n)).collect()
}

/// Place each latent above the centroid of its children.
fn position_latents(graph: &mut Graph, latents: &LatentMap) {
    for block in latents.blocks() {
        let points: Vec<(f64, f64)> = block
            .children
            .iter()
            .filter_map(|c| graph.id(c))
            .filter_map(|id| graph.node(id).map(|n| n.position))
            .collect();
        if points.is_empty() {
            continue;
        }
        let count = points.len() as f64;
        let x = points.iter().map(|p| p.0).sum::<f64>() / count;
        let y = points.iter().map(|p| p.1).sum::<f64>() / count - 80.0;
        if let Some(node) = graph.id(&block.latent).and_then(|id| graph.node_mut(id)) {
            node.position = (x, y);
        }
    }
}
