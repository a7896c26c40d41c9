//! Zero-based redesign
//!
//! Re-derives the workflow from first principles. The baseline assumption is
//! always challenged; scope (data sources, operations) and risk exposure add
//! further challenges and scale the savings estimate.

use crate::types::{Level, ParsedIntent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroBasedDesign {
    pub assumptions_challenged: Vec<String>,
    pub radical_approach: String,
    /// Percentage, always below 100
    pub potential_savings: f64,
    pub implementation_risk: Level,
}

const BASE_SAVINGS: f64 = 30.0;
const SAVINGS_PER_RISK_POINT: f64 = 4.0;
const SCOPE_SAVINGS: f64 = 10.0;
const MAX_SAVINGS: f64 = 95.0;

const MANY_DATA_SOURCES: usize = 3;
const MANY_OPERATIONS: usize = 5;

const HIGH_RISK_EXPOSURE: u32 = 12;
const MEDIUM_RISK_EXPOSURE: u32 = 4;

/// Sum of severity x likelihood over all risks
fn risk_exposure(intent: &ParsedIntent) -> u32 {
    intent
        .potential_risks
        .iter()
        .map(|risk| risk.severity.weight() * risk.likelihood.weight())
        .sum()
}

pub fn apply_zero_based_design(intent: &ParsedIntent) -> ZeroBasedDesign {
    let exposure = risk_exposure(intent);
    let many_sources = intent.data_sources.len() > MANY_DATA_SOURCES;
    let many_operations = intent.required_operations.len() > MANY_OPERATIONS;

    let mut assumptions = vec![
        "The current sequence of steps is the only way to reach the goal".to_string(),
    ];

    if many_sources {
        assumptions.push(format!(
            "All {} data sources must be queried on every run",
            intent.data_sources.len()
        ));
    }

    if many_operations {
        assumptions.push(format!(
            "Each of the {} operations needs its own dedicated step",
            intent.required_operations.len()
        ));
    }

    if !intent.potential_risks.is_empty() {
        assumptions.push("Known risks must be mitigated inside the existing design".to_string());
    }

    if intent
        .potential_risks
        .iter()
        .any(|risk| risk.severity == Level::High)
    {
        assumptions.push("Free-form model calls are required where outcomes are critical".to_string());
    }

    let mut potential_savings = BASE_SAVINGS + exposure as f64 * SAVINGS_PER_RISK_POINT;
    if many_sources {
        potential_savings += SCOPE_SAVINGS;
    }
    if many_operations {
        potential_savings += SCOPE_SAVINGS;
    }
    let potential_savings = potential_savings.min(MAX_SAVINGS);

    let implementation_risk = if exposure >= HIGH_RISK_EXPOSURE {
        Level::High
    } else if exposure >= MEDIUM_RISK_EXPOSURE || many_sources || many_operations {
        Level::Medium
    } else {
        Level::Low
    };

    ZeroBasedDesign {
        assumptions_challenged: assumptions,
        radical_approach: radical_approach(intent, many_sources, many_operations, exposure),
        potential_savings,
        implementation_risk,
    }
}

fn radical_approach(intent: &ParsedIntent, many_sources: bool, many_operations: bool, exposure: u32) -> String {
    let mut approach = String::from(
        "Rebuild the workflow as a minimal pipeline of structured spec steps, keeping only what the goal requires",
    );

    if many_sources {
        approach.push_str(&format!(
            "; consolidate {} data sources behind a single cached retrieval layer",
            intent.data_sources.len()
        ));
    }

    if many_operations {
        approach.push_str("; collapse related operations into batched stages");
    }

    if exposure > 0 {
        approach.push_str("; design out the identified risks instead of guarding against them");
    }

    approach
}
