use serde::{Deserialize, Serialize};

use super::defaults;

/// How per-pair edge-type frequencies become the ensemble graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsemblePolicy {
    /// Keep the first run's graph; frequencies are annotations only.
    Preserved,
    /// Most frequent type per pair, absence included.
    Highest,
    /// Most frequent edge type, kept only above half of the runs.
    #[default]
    Majority,
}

impl std::fmt::Display for EnsemblePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Preserved => "preserved",
            Self::Highest => "highest",
            Self::Majority => "majority",
        })
    }
}

/// Bootstrap ensemble configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub runs: usize,
    /// Resample size as a fraction of the dataset rows.
    pub resample_fraction: f64,
    pub with_replacement: bool,
    /// Add one extra run on the unresampled data.
    pub include_original: bool,
    pub policy: EnsemblePolicy,
    /// Run `i` draws from a generator seeded with `seed + i`.
    pub seed: u64,
    pub parallel: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            runs: defaults::DEFAULT_RUNS,
            resample_fraction: defaults::DEFAULT_RESAMPLE_FRACTION,
            with_replacement: defaults::DEFAULT_WITH_REPLACEMENT,
            include_original: defaults::DEFAULT_INCLUDE_ORIGINAL,
            policy: EnsemblePolicy::default(),
            seed: defaults::DEFAULT_SEED,
            parallel: defaults::DEFAULT_ENSEMBLE_PARALLEL,
        }
    }
}
