//! Separating sets and the skeleton removal audit trail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A conditioning set that rendered a pair independent. Names are kept sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sepset {
    pub nodes: Vec<String>,
    /// P-value of the separating test; `None` for knowledge removals.
    pub p_value: Option<f64>,
}

impl Sepset {
    pub fn new(mut nodes: Vec<String>, p_value: Option<f64>) -> Self {
        nodes.sort();
        nodes.dedup();
        Self { nodes, p_value }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Why the skeleton search dropped an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// An independence test succeeded; the conditioning set is the sepset.
    Sepset,
    /// Knowledge forbids the pair in both directions.
    Knowledge,
}

/// One entry of the removal audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removal {
    pub x: String,
    pub y: String,
    pub reason: RemovalReason,
    pub sepset: Sepset,
    /// Conditioning-set size at removal; `None` for knowledge removals.
    pub depth: Option<usize>,
}

/// Pair-keyed sepsets. `(x, y)` and `(y, x)` address the same entry.
#[derive(Debug, Clone, Default)]
pub struct SepsetMap {
    sets: BTreeMap<(String, String), Sepset>,
    removals: Vec<Removal>,
}

impl SepsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, x: &str, y: &str, sepset: Sepset) {
        self.sets.insert(key(x, y), sepset);
    }

    pub fn get(&self, x: &str, y: &str) -> Option<&Sepset> {
        self.sets.get(&key(x, y))
    }

    pub fn contains_pair(&self, x: &str, y: &str) -> bool {
        self.sets.contains_key(&key(x, y))
    }

    /// Whether `z` separates `x` and `y`; `None` if the pair has no sepset.
    pub fn separates(&self, x: &str, y: &str, z: &str) -> Option<bool> {
        self.get(x, y).map(|s| s.contains(z))
    }

    /// Store the sepset and append the removal to the audit trail.
    pub fn record_removal(
        &mut self,
        x: &str,
        y: &str,
        reason: RemovalReason,
        sepset: Sepset,
        depth: Option<usize>,
    ) {
        self.removals.push(Removal {
            x: x.to_string(),
            y: y.to_string(),
            reason,
            sepset: sepset.clone(),
            depth,
        });
        self.set(x, y, sepset);
    }

    /// Removals in the order they happened.
    pub fn removals(&self) -> &[Removal] {
        &self.removals
    }

    pub fn removal_reason(&self, x: &str, y: &str) -> Option<RemovalReason> {
        self.removals
            .iter()
            .find(|r| key(&r.x, &r.y) == key(x, y))
            .map(|r| r.reason)
    }

    /// Entries keyed by lexically ordered name pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), &Sepset)> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn key(x: &str, y: &str) -> (String, String) {
    if x <= y {
        (x.to_string(), y.to_string())
    } else {
        (y.to_string(), x.to_string())
    }
}
