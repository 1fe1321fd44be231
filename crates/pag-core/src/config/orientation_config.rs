use serde::{Deserialize, Serialize};

use super::defaults;

/// How R0 decides whether an unshielded triple is a collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderStrategyKind {
    /// Collider iff the middle node is absent from the stored sepset.
    #[default]
    SepsetBased,
    /// Re-test over minimal separating sets; orient only when they agree.
    Conservative,
    /// Use the separating set with the highest p-value.
    MaxP,
}

impl std::fmt::Display for ColliderStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SepsetBased => "sepset_based",
            Self::Conservative => "conservative",
            Self::MaxP => "max_p",
        })
    }
}

/// Orientation engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub collider_strategy: ColliderStrategyKind,
    /// Run Zhang's rules R5 to R10 after R1 to R4.
    pub complete_rule_set: bool,
    /// Run the discriminating path rule (R4).
    pub discriminating_path_rule: bool,
    /// Longest discriminating path, counted in nodes; -1 means unbounded.
    pub max_discriminating_path_length: i32,
    /// Repair almost-cycles and directed cycles after the rules settle.
    pub guarantee_pag: bool,
    /// Bound on outer fixpoint passes.
    pub max_passes: usize,
    /// Largest conditioning set the conservative and max-p strategies try;
    /// -1 means unbounded.
    pub strategy_depth: i32,
    /// Tag directed edges of the final graph with `dd`/`pd` and `nl`/`pl`.
    pub edge_markup: bool,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            collider_strategy: ColliderStrategyKind::default(),
            complete_rule_set: defaults::DEFAULT_COMPLETE_RULE_SET,
            discriminating_path_rule: defaults::DEFAULT_DISCRIMINATING_PATH_RULE,
            max_discriminating_path_length: defaults::DEFAULT_MAX_DISCRIMINATING_PATH_LENGTH,
            guarantee_pag: defaults::DEFAULT_GUARANTEE_PAG,
            max_passes: defaults::DEFAULT_MAX_PASSES,
            strategy_depth: defaults::DEFAULT_STRATEGY_DEPTH,
            edge_markup: defaults::DEFAULT_EDGE_MARKUP,
        }
    }
}
