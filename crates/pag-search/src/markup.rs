//! Edge specialization markup for the directed edges of a finished graph.
//!
//! `x --> y` is tagged `dd` when a semidirected path from `x` to `y`
//! survives without the edge itself, and `pd` otherwise. It is tagged `nl`
//! when definitely visible and `pl` otherwise. Other edges lose any
//! properties they carried.

use serde::Serialize;
use tracing::{debug, info};

use pag_core::graph::paths::{exists_semidirected_path, is_definitely_visible};
use pag_core::{EdgeProperty, Graph, PagResult};

/// How many directed edges received each tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkupSummary {
    pub dd: usize,
    pub pd: usize,
    pub nl: usize,
    pub pl: usize,
}

pub fn mark_edge_specializations(graph: &mut Graph) -> PagResult<MarkupSummary> {
    let mut tags = Vec::new();
    for (a, b) in graph.edge_pairs() {
        let (tail, head) = if graph.is_parent_of(a, b) {
            (a, b)
        } else if graph.is_parent_of(b, a) {
            (b, a)
        } else {
            tags.push((a, b, None));
            continue;
        };
        let direct = if exists_semidirected_path(graph, tail, head, Some((tail, head))) {
            EdgeProperty::Dd
        } else {
            EdgeProperty::Pd
        };
        let latent = if is_definitely_visible(graph, tail, head) {
            EdgeProperty::Nl
        } else {
            EdgeProperty::Pl
        };
        tags.push((a, b, Some((direct, latent))));
    }

    let mut summary = MarkupSummary::default();
    for (a, b, tag) in tags {
        graph.clear_edge_properties(a, b)?;
        let Some((direct, latent)) = tag else {
            continue;
        };
        graph.add_edge_property(a, b, direct)?;
        graph.add_edge_property(a, b, latent)?;
        match direct {
            EdgeProperty::Dd => summary.dd += 1,
            _ => summary.pd += 1,
        }
        match latent {
            EdgeProperty::Nl => summary.nl += 1,
            _ => summary.pl += 1,
        }
        debug!(x = graph.name(a), y = graph.name(b), %direct, %latent, "edge marked");
    }
    info!(dd = summary.dd, pd = summary.pd, nl = summary.nl, pl = summary.pl, "edge markup complete");
    Ok(summary)
}
