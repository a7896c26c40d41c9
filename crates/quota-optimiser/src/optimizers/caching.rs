//! Caching Layer Planner
//!
//! **Purpose**: Select cacheable steps and assign each a key, TTL and hit rate.
//!
//! # Detection Patterns
//! - Data retrieval steps (unless the description implies randomness or writes)
//! - Read-like vibe steps: lookups, summaries, classification with no
//!   non-deterministic or side-effecting vocabulary
//! - Spec, processing and analysis steps are never cached
//!
//! # Keys and TTLs
//! ```text
//! cache_key = "{type}:{sorted inputs joined by '|'}"
//! config data_retrieval → 3600s, other data_retrieval → 1800s, vibe → 900s
//! ```
//! A key shared by two or more selected steps gets a higher hit rate than a singleton.

use crate::types::{CachePoint, StepType, Workflow, WorkflowStep};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CachingPlan {
    pub cache_points: Vec<CachePoint>,
    /// Mean hit rate over all cache points, 0 when none
    pub estimated_hit_rate: f64,
}

pub const CONFIG_TTL_SECS: u64 = 3600;
pub const DATA_TTL_SECS: u64 = 1800;
pub const VIBE_TTL_SECS: u64 = 900;

const RECURRING_HIT_RATE_BONUS: f64 = 0.2;
const MAX_HIT_RATE: f64 = 0.95;

const NON_DETERMINISTIC: &[&str] = &[
    "random", "randomly", "randomize", "randomise", "shuffle", "sample", "brainstorm", "creative",
    "generate", "invent", "unique", "novel", "timestamp", "now", "current", "live", "realtime",
    "stream",
];

const SIDE_EFFECTING: &[&str] = &[
    "write", "save", "store", "send", "post", "publish", "update", "delete", "remove", "insert",
    "create", "notify", "email", "upload", "deploy", "commit", "charge",
];

const READ_LIKE: &[&str] = &[
    "fetch", "get", "read", "load", "lookup", "look", "retrieve", "query", "search", "find",
    "list", "summarize", "summarise", "classify", "extract", "translate", "explain", "describe",
];

fn words(description: &str) -> impl Iterator<Item = String> + '_ {
    description
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

fn mentions(description: &str, vocabulary: &[&str]) -> bool {
    words(description).any(|w| vocabulary.contains(&w.as_str()))
}

/// Whether the step's description implies randomness, freshness or side effects
pub fn is_non_deterministic(step: &WorkflowStep) -> bool {
    mentions(&step.description, NON_DETERMINISTIC) || mentions(&step.description, SIDE_EFFECTING)
}

pub fn is_cacheable(step: &WorkflowStep) -> bool {
    if is_non_deterministic(step) {
        return false;
    }

    match step.step_type {
        StepType::DataRetrieval => true,
        StepType::Vibe => mentions(&step.description, READ_LIKE),
        StepType::Spec | StepType::Processing | StepType::Analysis => false,
    }
}

/// `"{type}:{sorted inputs joined by '|'}"`
pub fn cache_key(step: &WorkflowStep) -> String {
    let inputs: Vec<&str> = step.inputs.iter().map(String::as_str).collect();
    format!("{}:{}", step.step_type.as_str(), inputs.join("|"))
}

pub fn ttl_for(step: &WorkflowStep) -> u64 {
    match step.step_type {
        StepType::DataRetrieval => {
            let named_config = step.id.to_lowercase().contains("config")
                || step.description.to_lowercase().contains("config");
            if named_config {
                CONFIG_TTL_SECS
            } else {
                DATA_TTL_SECS
            }
        }
        _ => VIBE_TTL_SECS,
    }
}

/// Longer-lived data is more likely to be served from cache
fn base_hit_rate(ttl: u64) -> f64 {
    match ttl {
        CONFIG_TTL_SECS => 0.7,
        DATA_TTL_SECS => 0.6,
        _ => 0.4,
    }
}

pub fn implement_caching_layer(workflow: &Workflow) -> CachingPlan {
    let selected: Vec<(&WorkflowStep, String)> = workflow
        .steps
        .iter()
        .filter(|step| is_cacheable(step))
        .map(|step| (step, cache_key(step)))
        .collect();

    let mut key_counts: HashMap<&str, usize> = HashMap::new();
    for (_, key) in &selected {
        *key_counts.entry(key.as_str()).or_insert(0) += 1;
    }

    let cache_points: Vec<CachePoint> = selected
        .iter()
        .map(|(step, key)| {
            let ttl = ttl_for(step);
            let recurring = key_counts.get(key.as_str()).copied().unwrap_or(0) >= 2;
            let hit_rate = if recurring {
                (base_hit_rate(ttl) + RECURRING_HIT_RATE_BONUS).min(MAX_HIT_RATE)
            } else {
                base_hit_rate(ttl)
            };

            CachePoint {
                step_id: step.id.clone(),
                cache_key: key.clone(),
                ttl,
                estimated_hit_rate: hit_rate,
            }
        })
        .collect();

    let estimated_hit_rate = if cache_points.is_empty() {
        0.0
    } else {
        cache_points.iter().map(|p| p.estimated_hit_rate).sum::<f64>() / cache_points.len() as f64
    };

    tracing::debug!(
        workflow = %workflow.id,
        cache_points = cache_points.len(),
        estimated_hit_rate,
        "caching layer planned"
    );

    CachingPlan {
        cache_points,
        estimated_hit_rate,
    }
}
