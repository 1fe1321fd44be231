//! Per-pair winners for the vote-based ensemble policies.
//!
//! `Preserved` has no per-pair vote; the aggregator keeps the first run's
//! graph for it.

use std::collections::BTreeMap;

use pag_core::EdgeType;

use crate::tally::Observation;

/// Runs per edge type, summed over property sets.
pub fn type_counts(counts: &BTreeMap<Observation, usize>) -> BTreeMap<EdgeType, usize> {
    let mut by_type = BTreeMap::new();
    for (o, &n) in counts {
        *by_type.entry(o.edge_type).or_insert(0) += n;
    }
    by_type
}

/// The most frequent type, absence included. A tie with absence means no
/// edge; other ties go to the first type in `EdgeType` order.
pub fn highest(counts: &BTreeMap<Observation, usize>) -> Option<Observation> {
    let by_type = type_counts(counts);
    let nil = by_type.get(&EdgeType::Nil).copied().unwrap_or(0);
    let (edge_type, n) = best_edge_type(&by_type)?;
    if n <= nil {
        return None;
    }
    Some(with_properties(counts, edge_type))
}

/// The most frequent edge type, kept only when it occurred in more than
/// half of `runs`.
pub fn majority(counts: &BTreeMap<Observation, usize>, runs: usize) -> Option<Observation> {
    let by_type = type_counts(counts);
    let (edge_type, n) = best_edge_type(&by_type)?;
    if 2 * n <= runs {
        return None;
    }
    Some(with_properties(counts, edge_type))
}

fn best_edge_type(by_type: &BTreeMap<EdgeType, usize>) -> Option<(EdgeType, usize)> {
    by_type
        .iter()
        .filter(|(t, &n)| !t.is_nil() && n > 0)
        .fold(None, |best: Option<(EdgeType, usize)>, (&t, &n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((t, n)),
        })
}

/// The property set seen most often with `edge_type`.
fn with_properties(counts: &BTreeMap<Observation, usize>, edge_type: EdgeType) -> Observation {
    counts
        .iter()
        .filter(|(o, _)| o.edge_type == edge_type)
        .fold(None, |best: Option<(&Observation, usize)>, (o, &n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((o, n)),
        })
        .map(|(o, _)| o.clone())
        .unwrap_or(Observation {
            edge_type,
            properties: Default::default(),
        })
}
