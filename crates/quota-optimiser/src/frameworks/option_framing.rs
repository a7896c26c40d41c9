//! Three-tier option framing
//!
//! Savings rates are strictly increasing from conservative to bold, so the
//! quota savings are too whenever the workflow costs anything. ROI compares
//! the savings rate with an implementation cost rate per effort level.

use crate::types::{Level, OptionalParams, Workflow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignOption {
    pub name: String,
    pub summary: String,
    pub key_tradeoffs: Vec<String>,
    pub impact: Level,
    pub effort: Level,
    pub risk: Level,
    pub major_risks: Vec<String>,
    pub quota_savings: f64,
    pub estimated_roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionFraming {
    pub conservative: DesignOption,
    pub balanced: DesignOption,
    pub bold: DesignOption,
}

const CONSERVATIVE_RATE: f64 = 0.15;
const CONSERVATIVE_TIGHT_BUDGET_RATE: f64 = 0.25;
const BALANCED_RATE: f64 = 0.35;
const BOLD_RATE: f64 = 0.6;

fn implementation_cost_rate(effort: Level) -> f64 {
    match effort {
        Level::Low => 0.05,
        Level::Medium => 0.15,
        Level::High => 0.3,
    }
}

/// Positive for any positive savings rate
fn roi(savings_rate: f64, effort: Level) -> f64 {
    savings_rate / implementation_cost_rate(effort)
}

struct Tier {
    name: &'static str,
    summary: String,
    key_tradeoffs: &'static [&'static str],
    impact: Level,
    effort: Level,
    risk: Level,
    major_risks: &'static [&'static str],
    rate: f64,
}

impl Tier {
    fn into_option(self, total_cost: f64) -> DesignOption {
        DesignOption {
            name: self.name.to_string(),
            summary: self.summary,
            key_tradeoffs: self.key_tradeoffs.iter().map(|s| s.to_string()).collect(),
            impact: self.impact,
            effort: self.effort,
            risk: self.risk,
            major_risks: self.major_risks.iter().map(|s| s.to_string()).collect(),
            quota_savings: total_cost * self.rate,
            estimated_roi: roi(self.rate, self.effort),
        }
    }
}

pub fn generate_option_framing(workflow: &Workflow, params: Option<&OptionalParams>) -> OptionFraming {
    let params = params.copied().unwrap_or_default();
    let total_cost = workflow.total_quota_cost();

    let mut conservative = Tier {
        name: "Conservative: Targeted Caching",
        summary: "Cache repeated retrievals and deterministic calls without changing the step structure".to_string(),
        key_tradeoffs: &[
            "Smallest savings in exchange for near-zero disruption",
            "Leaves free-form vibe steps in place",
        ],
        impact: Level::Low,
        effort: Level::Low,
        risk: Level::Low,
        major_risks: &["Stale cached data if TTLs are too long"],
        rate: CONSERVATIVE_RATE,
    };

    let mut balanced = Tier {
        name: "Balanced: Structured Conversion",
        summary: "Convert repeatable vibe steps to specs and batch near-duplicate operations".to_string(),
        key_tradeoffs: &[
            "Moderate rework of the step sequence",
            "Structured specs trade flexibility for predictability",
        ],
        impact: Level::Medium,
        effort: Level::Medium,
        risk: Level::Medium,
        major_risks: &[
            "Converted specs may miss edge cases the vibe handled",
            "Batched calls fail together",
        ],
        rate: BALANCED_RATE,
    };

    let bold = Tier {
        name: "Bold: Zero-Based Redesign",
        summary: "Re-derive the workflow from its goal, decomposing it into bounded specs".to_string(),
        key_tradeoffs: &[
            "Largest savings but requires rebuilding the workflow",
            "Temporary loss of behavioural parity during migration",
        ],
        impact: Level::High,
        effort: Level::High,
        risk: Level::High,
        major_risks: &[
            "Redesign may drop implicit requirements",
            "Longer delivery before savings are realised",
        ],
        rate: BOLD_RATE,
    };

    if params.has_tight_budget() {
        conservative.rate = CONSERVATIVE_TIGHT_BUDGET_RATE;
        conservative.summary.push_str(", with a focus on cost reduction");
    }

    match params.performance_sensitivity {
        Some(Level::High) => {
            balanced.effort = Level::High;
            balanced.summary.push_str(", with performance optimization");
        }
        Some(Level::Low) => {
            conservative.effort = Level::Low;
            conservative.summary.push_str(", with minimal complexity");
        }
        _ => {}
    }

    OptionFraming {
        conservative: conservative.into_option(total_cost),
        balanced: balanced.into_option(total_cost),
        bold: bold.into_option(total_cost),
    }
}
