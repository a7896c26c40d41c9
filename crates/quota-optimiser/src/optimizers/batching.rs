//! Batching Strategy
//!
//! **Purpose**: Collapse near-identical steps of the same type into one batched call.
//!
//! # Example
//!
//! **Before**:
//! ```text
//! fetch profile for user_1 (vibe) → 10
//! fetch profile for user_2 (vibe) → 10
//! fetch profile for user_3 (vibe) → 10
//! ```
//!
//! **After**:
//! ```text
//! batch of 3 "fetch profile for" (vibe)
//! ```
//!
//! # Detection Logic
//! - Normalise descriptions: drop quoted text and identifier-like tokens
//!   (digits, underscores, paths, camelCase), lowercase, strip punctuation
//! - Group by (step type, normalised description)
//! - Groups of at least `min_batch_size` become a [`BatchedOperation`]

use crate::types::{BatchedOperation, StepType, Workflow};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const DEFAULT_MIN_BATCH_SIZE: usize = 3;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*"|'[^']*'|`[^`]*`"#).unwrap());
static IDENTIFIER_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d|_|/|::|[a-z][A-Z]").unwrap());

/// Normalised form used to detect near-duplicate operations
pub fn normalize_description(description: &str) -> String {
    let without_quotes = QUOTED.replace_all(description, " ");

    without_quotes
        .split_whitespace()
        .filter(|token| !IDENTIFIER_LIKE.is_match(token))
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Savings for `batch_size` items of `unit_cost` each.
/// `n - sqrt(n)` is strictly increasing for n >= 1 with diminishing marginal gain.
pub fn batch_savings(unit_cost: f64, batch_size: usize) -> f64 {
    let n = batch_size as f64;
    unit_cost * (n - n.sqrt())
}

pub fn apply_batching_strategy(workflow: &Workflow) -> Vec<BatchedOperation> {
    apply_batching_with_min(workflow, DEFAULT_MIN_BATCH_SIZE)
}

pub fn apply_batching_with_min(workflow: &Workflow, min_batch_size: usize) -> Vec<BatchedOperation> {
    let mut order: Vec<(StepType, String)> = vec![];
    let mut groups: HashMap<(StepType, String), Vec<usize>> = HashMap::new();

    for (idx, step) in workflow.steps.iter().enumerate() {
        // identifier-only descriptions normalise to "" and group by type alone
        let normalized = normalize_description(&step.description);
        let key = (step.step_type, normalized);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(idx);
    }

    let batches: Vec<BatchedOperation> = order
        .into_iter()
        .filter_map(|key| {
            let members = groups.remove(&key)?;
            if members.len() < min_batch_size {
                return None;
            }

            let (step_type, normalized) = key;
            let batch_size = members.len();
            let unit_cost = members
                .iter()
                .map(|&idx| workflow.steps[idx].quota_cost)
                .sum::<f64>()
                / batch_size as f64;

            Some(BatchedOperation {
                original_operations: members
                    .iter()
                    .map(|&idx| workflow.steps[idx].id.clone())
                    .collect(),
                batch_size,
                step_type,
                description: if normalized.is_empty() {
                    format!("Batch {} {} operations", batch_size, step_type.as_str())
                } else {
                    format!(
                        "Batch {} {} operations: {}",
                        batch_size,
                        step_type.as_str(),
                        normalized
                    )
                },
                estimated_savings: batch_savings(unit_cost, batch_size),
            })
        })
        .collect();

    tracing::debug!(workflow = %workflow.id, batches = batches.len(), "batching strategy applied");

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::step;

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_description("Fetch profile for user_42"), "fetch profile for");
        assert_eq!(normalize_description("Fetch Profile for 'alice'!"), "fetch profile for");
        assert_eq!(normalize_description("load /etc/app.toml via fileLoader"), "load via");
        assert_eq!(normalize_description("42"), "");
    }

    #[test]
    fn test_group_of_three_is_batched() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("a", StepType::Vibe, "Summarise ticket 101", 10.0),
                step("b", StepType::Vibe, "Summarise ticket 102", 10.0),
                step("x", StepType::Spec, "Validate schema", 1.0),
                step("c", StepType::Vibe, "summarise ticket 103", 10.0),
            ],
        );

        let batches = apply_batching_strategy(&workflow);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_size, 3);
        assert_eq!(batches[0].original_operations, vec!["a", "b", "c"]);
        assert_eq!(batches[0].step_type, StepType::Vibe);
        assert!(batches[0].estimated_savings > 0.0);
    }

    #[test]
    fn test_small_or_mixed_groups_are_not_batched() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("a", StepType::Vibe, "fetch order 1", 5.0),
                step("b", StepType::Vibe, "fetch order 2", 5.0),
                step("c", StepType::DataRetrieval, "fetch order 3", 5.0),
                step("d", StepType::DataRetrieval, "fetch order 4", 5.0),
            ],
        );

        assert!(apply_batching_strategy(&workflow).is_empty());
    }

    #[test]
    fn test_identifier_only_descriptions_batch_by_type() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("a", StepType::Vibe, "fetch_user_1", 4.0),
                step("b", StepType::Vibe, "fetch_user_2", 4.0),
                step("c", StepType::Vibe, "fetch_user_3", 4.0),
                step("d", StepType::Spec, "", 1.0),
                step("e", StepType::Spec, "", 1.0),
                step("f", StepType::Spec, "", 1.0),
            ],
        );

        let batches = apply_batching_strategy(&workflow);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].original_operations, vec!["a", "b", "c"]);
        assert_eq!(batches[0].description, "Batch 3 vibe operations");
        assert_eq!(batches[1].original_operations, vec!["d", "e", "f"]);
        assert_eq!(batches[1].step_type, StepType::Spec);
    }

    #[test]
    fn test_savings_increase_with_batch_size() {
        let mut previous = batch_savings(10.0, 1);
        for n in 2..50 {
            let current = batch_savings(10.0, n);
            assert!(current > previous);
            previous = current;
        }
    }
}
