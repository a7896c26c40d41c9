//! Parameter-driven savings adjustments
//!
//! Each rule is a pure `(estimate, policy) -> estimate` function so it can be
//! tested on its own. [`policies_for`] decides which rules apply to which
//! optimisation type.

use crate::types::{EstimatedSavings, Level, OptimizationType, OptionalParams};
use serde::{Deserialize, Serialize};

/// `max_vibes` at or below this is a tight budget
pub const TIGHT_BUDGET_MAX_VIBES: f64 = 100.0;

/// `max_cost_dollars` at or below this is a tight budget
pub const TIGHT_BUDGET_MAX_DOLLARS: f64 = 50.0;

/// `expected_user_volume` above this is high volume
pub const HIGH_VOLUME_USERS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentPolicy {
    TightBudget,
    HighVolume,
    PerformanceSensitive,
}

impl AdjustmentPolicy {
    pub fn multiplier(&self) -> f64 {
        match self {
            AdjustmentPolicy::TightBudget => 1.2,
            AdjustmentPolicy::HighVolume => 1.3,
            AdjustmentPolicy::PerformanceSensitive => 1.15,
        }
    }
}

/// Scale an estimate by one policy. Percentage stays within 0-100.
pub fn adjust(base: EstimatedSavings, policy: AdjustmentPolicy) -> EstimatedSavings {
    let factor = policy.multiplier();
    EstimatedSavings {
        vibes: base.vibes * factor,
        specs: base.specs,
        percentage: (base.percentage * factor).clamp(0.0, 100.0),
    }
}

/// Apply each policy in order
pub fn adjust_all(base: EstimatedSavings, policies: &[AdjustmentPolicy]) -> EstimatedSavings {
    policies.iter().fold(base, |estimate, &policy| adjust(estimate, policy))
}

impl OptionalParams {
    pub fn has_tight_budget(&self) -> bool {
        self.cost_constraints.map_or(false, |c| {
            c.max_vibes.map_or(false, |v| v <= TIGHT_BUDGET_MAX_VIBES)
                || c.max_cost_dollars.map_or(false, |d| d <= TIGHT_BUDGET_MAX_DOLLARS)
        })
    }

    pub fn is_high_volume(&self) -> bool {
        self.expected_user_volume.map_or(false, |v| v > HIGH_VOLUME_USERS)
    }

    pub fn is_performance_sensitive(&self) -> bool {
        self.performance_sensitivity == Some(Level::High)
    }
}

/// Policies that apply to an optimisation type under the given params
pub fn policies_for(optimization_type: OptimizationType, params: &OptionalParams) -> Vec<AdjustmentPolicy> {
    let mut policies = vec![];

    if params.has_tight_budget() {
        policies.push(AdjustmentPolicy::TightBudget);
    }

    match optimization_type {
        OptimizationType::Caching | OptimizationType::Batching if params.is_high_volume() => {
            policies.push(AdjustmentPolicy::HighVolume);
        }
        OptimizationType::VibeToSpec if params.is_performance_sensitive() => {
            policies.push(AdjustmentPolicy::PerformanceSensitive);
        }
        _ => {}
    }

    policies
}
