/// Engine tuning thresholds
/// Loads from environment variables with validation and defaults

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Parse usize from environment with default
fn get_env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse f64 from environment with default
fn get_env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Thresholds used by the spec decomposer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionConfig {
    /// Workflows this size or smaller without a cost outlier are left whole
    pub small_workflow_steps: usize,

    /// A step costing this multiple of the mean cost is isolated
    pub outlier_multiple: f64,

    pub min_spec_steps: usize,
    pub max_spec_steps: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            small_workflow_steps: 5,
            outlier_multiple: 3.0,
            min_spec_steps: 2,
            max_spec_steps: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// More same-type steps than this triggers a decomposition optimisation
    pub uniform_type_threshold: usize,

    /// Smallest group of near-identical steps worth batching
    pub min_batch_size: usize,

    pub decomposition: DecompositionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            uniform_type_threshold: 10,
            min_batch_size: 3,
            decomposition: DecompositionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let defaults = Self::default();
        let decomposition = defaults.decomposition;

        Ok(Self {
            uniform_type_threshold: get_env_usize(
                "QOPT_UNIFORM_TYPE_THRESHOLD",
                defaults.uniform_type_threshold,
            ),
            min_batch_size: get_env_usize("QOPT_MIN_BATCH_SIZE", defaults.min_batch_size),
            decomposition: DecompositionConfig {
                small_workflow_steps: get_env_usize(
                    "QOPT_SMALL_WORKFLOW_STEPS",
                    decomposition.small_workflow_steps,
                ),
                outlier_multiple: get_env_f64("QOPT_OUTLIER_MULTIPLE", decomposition.outlier_multiple),
                min_spec_steps: get_env_usize("QOPT_MIN_SPEC_STEPS", decomposition.min_spec_steps),
                max_spec_steps: get_env_usize("QOPT_MAX_SPEC_STEPS", decomposition.max_spec_steps),
            },
        })
    }

    /// Validate configuration values
    pub fn validate(self) -> Result<Self> {
        if self.min_batch_size < 2 {
            anyhow::bail!("min_batch_size must be at least 2, got {}", self.min_batch_size);
        }

        let d = &self.decomposition;
        if !d.outlier_multiple.is_finite() || d.outlier_multiple <= 1.0 {
            anyhow::bail!("outlier_multiple must be greater than 1, got {}", d.outlier_multiple);
        }

        if d.min_spec_steps == 0 {
            anyhow::bail!("min_spec_steps must be at least 1");
        }

        if d.max_spec_steps < d.min_spec_steps {
            anyhow::bail!(
                "max_spec_steps ({}) must not be below min_spec_steps ({})",
                d.max_spec_steps,
                d.min_spec_steps
            );
        }

        Ok(self)
    }
}
