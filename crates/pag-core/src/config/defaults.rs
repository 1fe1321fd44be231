//! Compiled defaults for every config field.

// Skeleton
pub const DEFAULT_DEPTH: i32 = -1;
pub const DEFAULT_STABLE: bool = true;
pub const DEFAULT_SKELETON_PARALLEL: bool = true;
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 0;
pub const DEFAULT_TEST_WORKERS: usize = 8;

// Orientation
pub const DEFAULT_COMPLETE_RULE_SET: bool = true;
pub const DEFAULT_DISCRIMINATING_PATH_RULE: bool = true;
pub const DEFAULT_MAX_DISCRIMINATING_PATH_LENGTH: i32 = -1;
pub const DEFAULT_GUARANTEE_PAG: bool = false;
pub const DEFAULT_MAX_PASSES: usize = 1_000;
pub const DEFAULT_STRATEGY_DEPTH: i32 = -1;
pub const DEFAULT_EDGE_MARKUP: bool = false;

// Latent introduction
pub const DEFAULT_LATENT_ENABLED: bool = false;
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4;
pub const DEFAULT_LATENT_PREFIX: &str = "L";

// Ensemble
pub const DEFAULT_RUNS: usize = 10;
pub const DEFAULT_RESAMPLE_FRACTION: f64 = 1.0;
pub const DEFAULT_WITH_REPLACEMENT: bool = true;
pub const DEFAULT_INCLUDE_ORIGINAL: bool = false;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ENSEMBLE_PARALLEL: bool = true;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
