use serde::{Deserialize, Serialize};

use super::defaults;

/// Conditioning set used to confirm that candidate children stay dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatentCheck {
    /// Condition on the whole candidate parent block.
    #[default]
    Direct,
    /// Condition only on candidate parents with a definite tail into the children.
    Minimal,
}

/// Latent-introduction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatentConfig {
    pub enabled: bool,
    pub check: LatentCheck,
    /// Largest parent or child block tried per seed.
    pub max_block_size: usize,
    /// Latents are named `{prefix}{n}`, n counting from 1.
    pub latent_prefix: String,
}

impl Default for LatentConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_LATENT_ENABLED,
            check: LatentCheck::default(),
            max_block_size: defaults::DEFAULT_MAX_BLOCK_SIZE,
            latent_prefix: defaults::DEFAULT_LATENT_PREFIX.to_string(),
        }
    }
}
