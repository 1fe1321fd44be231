use serde::{Deserialize, Serialize};

use super::defaults;

/// Adjacency search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    /// Largest conditioning-set size; -1 means unbounded.
    pub depth: i32,
    /// Freeze adjacency sets at the start of each depth.
    pub stable: bool,
    /// Run the tests of one depth on the rayon pool. Needs `stable`.
    pub parallel: bool,
    /// Per-test time limit in milliseconds; 0 disables it.
    pub test_timeout_ms: u64,
    /// Threads serving timed tests. Unused when there is no time limit.
    pub test_workers: usize,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            depth: defaults::DEFAULT_DEPTH,
            stable: defaults::DEFAULT_STABLE,
            parallel: defaults::DEFAULT_SKELETON_PARALLEL,
            test_timeout_ms: defaults::DEFAULT_TEST_TIMEOUT_MS,
            test_workers: defaults::DEFAULT_TEST_WORKERS,
        }
    }
}
