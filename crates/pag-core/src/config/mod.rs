//! Configuration for the PAG engine.
//! TOML-based; every field falls back to a compiled default.

pub mod defaults;
pub mod ensemble_config;
pub mod latent_config;
pub mod observability_config;
pub mod orientation_config;
pub mod skeleton_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, PagResult};

pub use ensemble_config::{EnsembleConfig, EnsemblePolicy};
pub use latent_config::{LatentCheck, LatentConfig};
pub use observability_config::ObservabilityConfig;
pub use orientation_config::{ColliderStrategyKind, OrientationConfig};
pub use skeleton_config::SkeletonConfig;

/// Top-level configuration aggregating all sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagConfig {
    pub skeleton: SkeletonConfig,
    pub orientation: OrientationConfig,
    pub latent: LatentConfig,
    pub ensemble: EnsembleConfig,
    pub observability: ObservabilityConfig,
}

impl PagConfig {
    /// Parse and validate a TOML document. Missing fields take defaults.
    pub fn from_toml(toml_str: &str) -> PagResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: &Path) -> PagResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> PagResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::Parse {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> PagResult<()> {
        if self.skeleton.depth < -1 {
            return Err(invalid("skeleton.depth", "must be -1 (unbounded) or >= 0"));
        }
        if self.skeleton.parallel && !self.skeleton.stable {
            return Err(invalid(
                "skeleton.parallel",
                "parallel testing requires the stable adjacency policy",
            ));
        }
        if self.skeleton.test_timeout_ms > 0 && self.skeleton.test_workers == 0 {
            return Err(invalid("skeleton.test_workers", "must be at least 1 when tests are timed"));
        }
        let len = self.orientation.max_discriminating_path_length;
        if len != -1 && len < 4 {
            return Err(invalid(
                "orientation.max_discriminating_path_length",
                "must be -1 (unbounded) or >= 4",
            ));
        }
        if self.orientation.max_passes == 0 {
            return Err(invalid("orientation.max_passes", "must be at least 1"));
        }
        if self.orientation.strategy_depth < -1 {
            return Err(invalid(
                "orientation.strategy_depth",
                "must be -1 (unbounded) or >= 0",
            ));
        }
        if self.latent.max_block_size < 2 {
            return Err(invalid("latent.max_block_size", "must be at least 2"));
        }
        if self.latent.latent_prefix.is_empty() {
            return Err(invalid("latent.latent_prefix", "must not be empty"));
        }
        if self.ensemble.runs == 0 {
            return Err(invalid("ensemble.runs", "must be at least 1"));
        }
        let f = self.ensemble.resample_fraction;
        let fraction_ok = if self.ensemble.with_replacement {
            f > 0.0 && f.is_finite()
        } else {
            f > 0.0 && f <= 1.0
        };
        if !fraction_ok {
            return Err(invalid(
                "ensemble.resample_fraction",
                "must be in (0, 1] without replacement, or > 0 with replacement",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> crate::errors::PagError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}
