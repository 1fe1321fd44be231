//! Latent-to-latent edges by parent-set inclusion.
//!
//! When the parents of `La` are a strict subset of the parents of `Lb`,
//! `La -> Lb` is added and `Lb` drops the parents it now reaches through
//! `La`. Only the covering relation is used, so chains stay transitively
//! reduced.

use std::collections::BTreeSet;

use tracing::debug;

use pag_core::{Endpoint, Graph, PagResult};

use super::LatentMap;

/// Add latent-to-latent edges to `graph` and return them as `(from, to)`.
pub fn arrange(graph: &mut Graph, latents: &LatentMap) -> PagResult<Vec<(String, String)>> {
    let blocks = latents.blocks();
    let sets: Vec<BTreeSet<&str>> = blocks
        .iter()
        .map(|b| b.parents.iter().map(String::as_str).collect())
        .collect();
    let strict = |i: usize, j: usize| sets[i].len() < sets[j].len() && sets[i].is_subset(&sets[j]);

    let mut added = Vec::new();
    for j in 0..blocks.len() {
        for i in 0..blocks.len() {
            if !strict(i, j) {
                continue;
            }
            if (0..blocks.len()).any(|k| strict(i, k) && strict(k, j)) {
                continue;
            }
            let (Some(la), Some(lb)) = (graph.id(&blocks[i].latent), graph.id(&blocks[j].latent)) else {
                continue;
            };
            if graph.is_adjacent(la, lb) || graph.exists_directed_path(lb, la) {
                continue;
            }
            graph.add_edge(la, Endpoint::Tail, lb, Endpoint::Arrow)?;
            for parent in &blocks[i].parents {
                if let Some(p) = graph.id(parent) {
                    graph.remove_edge(p, lb);
                }
            }
            debug!(from = %blocks[i].latent, to = %blocks[j].latent, "latent hierarchy edge");
            added.push((blocks[i].latent.clone(), blocks[j].latent.clone()));
        }
    }
    Ok(added)
}
