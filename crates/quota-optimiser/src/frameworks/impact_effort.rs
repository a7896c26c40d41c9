//! Impact/effort matrix - deterministic quadrant classification of optimisations

use crate::types::{Level, Optimization, OptimizationType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactEffortMatrix {
    pub high_impact_low_effort: Vec<Optimization>,
    pub high_impact_high_effort: Vec<Optimization>,
    pub low_impact_low_effort: Vec<Optimization>,
    pub low_impact_high_effort: Vec<Optimization>,
}

/// Savings percentage at or above which an optimisation is high impact
pub const HIGH_IMPACT_PERCENTAGE: f64 = 30.0;

pub fn effort_for(optimization_type: OptimizationType) -> Level {
    match optimization_type {
        OptimizationType::Caching => Level::Low,
        OptimizationType::Batching | OptimizationType::VibeToSpec => Level::Medium,
        OptimizationType::Decomposition => Level::High,
    }
}

/// Medium effort buckets as low unless the estimator marked it high
fn is_high_effort(optimization: &Optimization) -> bool {
    optimization
        .effort
        .unwrap_or_else(|| effort_for(optimization.optimization_type))
        == Level::High
}

fn is_high_impact(optimization: &Optimization) -> bool {
    optimization.estimated_savings.percentage >= HIGH_IMPACT_PERCENTAGE
}

pub fn apply_impact_effort_matrix(optimizations: &[Optimization]) -> ImpactEffortMatrix {
    let mut matrix = ImpactEffortMatrix::default();

    for optimization in optimizations {
        let quadrant = match (is_high_impact(optimization), is_high_effort(optimization)) {
            (true, false) => &mut matrix.high_impact_low_effort,
            (true, true) => &mut matrix.high_impact_high_effort,
            (false, false) => &mut matrix.low_impact_low_effort,
            (false, true) => &mut matrix.low_impact_high_effort,
        };
        quadrant.push(optimization.clone());
    }

    matrix
}
