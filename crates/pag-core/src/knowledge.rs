//! Background knowledge: directional forbidden/required pairs and temporal tiers.
//!
//! Everything is keyed by node name so knowledge survives node renaming and
//! graph copies. A pair `(from, to)` always means the edge `from --> to`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{KnowledgeError, PagResult};
use crate::graph::{Edge, Endpoint, Graph};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Knowledge {
    forbidden: BTreeSet<(String, String)>,
    required: BTreeSet<(String, String)>,
    tiers: BTreeMap<String, usize>,
    forbidden_within: BTreeSet<usize>,
}

impl Knowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.required.is_empty() && self.tiers.is_empty()
    }

    // ---- explicit pairs ----

    /// Forbid `from --> to`. Fails if the same direction is already required.
    pub fn set_forbidden(&mut self, from: &str, to: &str) -> PagResult<()> {
        check_distinct(from, to)?;
        if self.is_required(from, to) {
            return Err(contradiction(from, to));
        }
        self.forbidden.insert(pair(from, to));
        Ok(())
    }

    pub fn remove_forbidden(&mut self, from: &str, to: &str) {
        self.forbidden.remove(&pair(from, to));
    }

    /// Require `from --> to`. Fails if the same direction is explicitly forbidden.
    /// A required edge overrides any tier prohibition.
    pub fn set_required(&mut self, from: &str, to: &str) -> PagResult<()> {
        check_distinct(from, to)?;
        if self.forbidden.contains(&pair(from, to)) {
            return Err(contradiction(from, to));
        }
        self.required.insert(pair(from, to));
        Ok(())
    }

    pub fn remove_required(&mut self, from: &str, to: &str) {
        self.required.remove(&pair(from, to));
    }

    pub fn is_required(&self, from: &str, to: &str) -> bool {
        self.required.contains(&pair(from, to))
    }

    pub fn is_explicitly_forbidden(&self, from: &str, to: &str) -> bool {
        self.forbidden.contains(&pair(from, to))
    }

    /// Whether `from --> to` is ruled out, explicitly or by tiers.
    pub fn is_forbidden(&self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        self.is_explicitly_forbidden(from, to)
            || (self.is_forbidden_by_tiers(from, to) && !self.is_required(from, to))
    }

    /// True iff neither direction between `x` and `y` is required.
    pub fn no_edge_required(&self, x: &str, y: &str) -> bool {
        !(self.is_required(x, y) || self.is_required(y, x))
    }

    /// Whether both directions are forbidden and neither is required, so the
    /// pair can never be adjacent.
    pub fn is_adjacency_forbidden(&self, x: &str, y: &str) -> bool {
        self.is_forbidden(x, y) && self.is_forbidden(y, x) && self.no_edge_required(x, y)
    }

    pub fn required_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.required.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn forbidden_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forbidden.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    // ---- tiers ----

    /// Place `var` in `tier`, moving it out of any earlier tier.
    pub fn add_to_tier(&mut self, tier: usize, var: &str) {
        self.tiers.insert(var.to_string(), tier);
    }

    pub fn set_tier<S: AsRef<str>>(&mut self, tier: usize, vars: &[S]) {
        self.tiers.retain(|_, t| *t != tier);
        for v in vars {
            self.add_to_tier(tier, v.as_ref());
        }
    }

    pub fn remove_from_tiers(&mut self, var: &str) {
        self.tiers.remove(var);
    }

    pub fn tier_of(&self, var: &str) -> Option<usize> {
        self.tiers.get(var).copied()
    }

    /// Variables in `tier`, sorted by name.
    pub fn tier(&self, tier: usize) -> Vec<String> {
        self.tiers
            .iter()
            .filter(|(_, t)| **t == tier)
            .map(|(v, _)| v.clone())
            .collect()
    }

    /// One past the highest tier index in use.
    pub fn num_tiers(&self) -> usize {
        self.tiers.values().max().map_or(0, |t| t + 1)
    }

    /// Forbid (or allow) edges between two variables of the same tier.
    /// Fails if a required edge already lies within that tier.
    pub fn set_tier_forbidden_within(&mut self, tier: usize, forbidden: bool) -> PagResult<()> {
        if !forbidden {
            self.forbidden_within.remove(&tier);
            return Ok(());
        }
        let clash = self
            .required
            .iter()
            .find(|(a, b)| self.tier_of(a) == Some(tier) && self.tier_of(b) == Some(tier));
        if let Some((a, b)) = clash {
            return Err(KnowledgeError::InvalidTier {
                tier,
                reason: format!("required edge {a} --> {b} lies within the tier"),
            }
            .into());
        }
        self.forbidden_within.insert(tier);
        Ok(())
    }

    pub fn is_tier_forbidden_within(&self, tier: usize) -> bool {
        self.forbidden_within.contains(&tier)
    }

    /// Later tiers cannot cause earlier ones; same-tier edges are forbidden
    /// only when the tier forbids them. Untiered variables are unconstrained.
    pub fn is_forbidden_by_tiers(&self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(t1), Some(t2)) if t1 == t2 => self.is_tier_forbidden_within(t1),
            (Some(t1), Some(t2)) => t1 > t2,
            _ => false,
        }
    }

    /// Names in `vars` that have no tier, in the given order.
    pub fn variables_not_in_tiers<S: AsRef<str>>(&self, vars: &[S]) -> Vec<String> {
        vars.iter()
            .map(AsRef::as_ref)
            .filter(|v| !self.tiers.contains_key(*v))
            .map(str::to_string)
            .collect()
    }

    // ---- consistency ----

    /// Check the invariants the setters enforce, for knowledge built by
    /// deserialization.
    pub fn validate(&self) -> PagResult<()> {
        if let Some((a, b)) = self.required.intersection(&self.forbidden).next() {
            return Err(contradiction(a, b));
        }
        for (a, b) in self.required.iter().chain(self.forbidden.iter()) {
            check_distinct(a, b)?;
        }
        Ok(())
    }

    /// Edges of `graph` whose orientation contradicts this knowledge: a
    /// directed edge in a forbidden direction, or an arrowhead at the source
    /// of a required edge.
    pub fn violations(&self, graph: &Graph) -> Vec<Edge> {
        graph
            .edges()
            .into_iter()
            .filter(|e| {
                if let Some((tail, head)) = e.direction() {
                    if self.is_forbidden(tail, head) {
                        return true;
                    }
                }
                self.required_head_contradicted(e, &e.node1, &e.node2)
                    || self.required_head_contradicted(e, &e.node2, &e.node1)
            })
            .collect()
    }

    pub fn is_violated_by(&self, graph: &Graph) -> bool {
        !self.violations(graph).is_empty()
    }

    fn required_head_contradicted(&self, e: &Edge, from: &str, to: &str) -> bool {
        self.is_required(from, to)
            && (e.endpoint_at(from) == Some(Endpoint::Arrow)
                || e.endpoint_at(to) == Some(Endpoint::Tail))
    }
}

impl std::fmt::Display for Knowledge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "/knowledge")?;
        writeln!(f, "addtemporal")?;
        for t in 0..self.num_tiers() {
            let marker = if self.is_tier_forbidden_within(t) { "*" } else { "" };
            writeln!(f, "{}{} {}", t + 1, marker, self.tier(t).join(" "))?;
        }
        writeln!(f, "\nforbiddirect")?;
        for (a, b) in &self.forbidden {
            writeln!(f, "{a} {b}")?;
        }
        writeln!(f, "\nrequiredirect")?;
        for (a, b) in &self.required {
            writeln!(f, "{a} {b}")?;
        }
        Ok(())
    }
}

fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

fn check_distinct(a: &str, b: &str) -> PagResult<()> {
    if a == b {
        Err(KnowledgeError::SelfReference {
            name: a.to_string(),
        }
        .into())
    } else {
        Ok(())
    }
}

fn contradiction(from: &str, to: &str) -> crate::errors::PagError {
    KnowledgeError::Contradiction {
        from: from.to_string(),
        to: to.to_string(),
    }
    .into()
}
