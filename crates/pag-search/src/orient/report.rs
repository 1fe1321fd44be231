//! Orientation metadata returned alongside the PAG.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The writer of a mark change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Initial,
    Knowledge,
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    Repair,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::Knowledge => "knowledge",
            Self::R0 => "R0",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
            Self::R5 => "R5",
            Self::R6 => "R6",
            Self::R7 => "R7",
            Self::R8 => "R8",
            Self::R9 => "R9",
            Self::R10 => "R10",
            Self::Repair => "repair",
        };
        f.write_str(s)
    }
}

/// Why a discriminating path did not orient its edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The path would exceed the configured length bound.
    LengthBound,
    /// The collider strategy could not decide.
    Ambiguous,
}

/// An edge `v o-* y` left with its circle because R4 could not settle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedPath {
    pub v: String,
    pub y: String,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    /// `x <-> y` with `x` an ancestor of `y`, rewritten to `x --> y`.
    AlmostCycle,
    /// A directed cycle broken by resetting one edge to `o-o`.
    DirectedCycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairAction {
    pub kind: RepairKind,
    /// Edge after the repair, e.g. `A --> B`.
    pub edge: String,
}

/// What the engine did during one `orient` or `complete` call.
#[derive(Debug, Clone, Serialize)]
pub struct OrientationReport {
    pub strategy: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passes: usize,
    /// False if `max_passes` ran out before a fixpoint.
    pub converged: bool,
    pub rule_counts: BTreeMap<Rule, usize>,
    /// Unshielded triples `(x, z, y)` the strategy could not decide.
    pub ambiguous_triples: Vec<(String, String, String)>,
    pub unresolved_paths: Vec<UnresolvedPath>,
    /// Commits the endpoint guard refused.
    pub refused: usize,
    pub repairs: Vec<RepairAction>,
    /// Set when the repair pass changed anything.
    pub repaired: bool,
}

impl OrientationReport {
    pub fn new(strategy: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            strategy: strategy.into(),
            started_at: now,
            finished_at: now,
            passes: 0,
            converged: false,
            rule_counts: BTreeMap::new(),
            ambiguous_triples: Vec::new(),
            unresolved_paths: Vec::new(),
            refused: 0,
            repairs: Vec::new(),
            repaired: false,
        }
    }

    pub fn count(&self, rule: Rule) -> usize {
        self.rule_counts.get(&rule).copied().unwrap_or(0)
    }

    pub fn total_changes(&self) -> usize {
        self.rule_counts.values().sum()
    }

    /// Wall-clock time between `new` and `finish`.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub(crate) fn record(&mut self, rule: Rule) {
        *self.rule_counts.entry(rule).or_insert(0) += 1;
    }

    pub(crate) fn unresolved(&mut self, v: &str, y: &str, reason: UnresolvedReason) {
        let entry = UnresolvedPath {
            v: v.to_string(),
            y: y.to_string(),
            reason,
        };
        if !self.unresolved_paths.contains(&entry) {
            self.unresolved_paths.push(entry);
        }
    }

    /// Fold a later report (e.g. a re-completion) into this one.
    pub fn absorb(&mut self, other: OrientationReport) {
        self.passes += other.passes;
        self.finished_at = self.finished_at.max(other.finished_at);
        self.converged = other.converged;
        for (rule, n) in other.rule_counts {
            *self.rule_counts.entry(rule).or_insert(0) += n;
        }
        self.ambiguous_triples.extend(other.ambiguous_triples);
        for u in other.unresolved_paths {
            if !self.unresolved_paths.contains(&u) {
                self.unresolved_paths.push(u);
            }
        }
        self.refused += other.refused;
        self.repairs.extend(other.repairs);
        self.repaired |= other.repaired;
    }
}
