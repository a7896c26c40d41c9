//! Spec Decomposer
//!
//! **Purpose**: Partition a large workflow into bounded, reviewable specs.
//!
//! Splits on step type and functional vocabulary (validation, retrieval,
//! transformation, analysis, output), isolates cost outliers, then chunks
//! oversized groups. Every step lands in exactly one spec; specs are ordered by
//! the position of their first member.

use crate::config::DecompositionConfig;
use crate::types::{Spec, StepType, Workflow, WorkflowStep};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Domain {
    Validation,
    Retrieval,
    Transformation,
    Evaluation,
    Output,
    General,
}

impl Domain {
    fn label(&self) -> &'static str {
        match self {
            Domain::Validation => "Validation",
            Domain::Retrieval => "Retrieval",
            Domain::Transformation => "Transformation",
            Domain::Evaluation => "Evaluation",
            Domain::Output => "Output",
            Domain::General => "General",
        }
    }
}

const VOCABULARY: &[(Domain, &[&str])] = &[
    (Domain::Validation, &["validate", "validation", "verify", "check", "ensure", "assert", "sanitize", "sanitise"]),
    (Domain::Retrieval, &["fetch", "get", "load", "read", "query", "retrieve", "download", "lookup"]),
    (Domain::Transformation, &["process", "transform", "convert", "parse", "compute", "calculate", "aggregate", "merge", "format", "normalize", "normalise"]),
    (Domain::Evaluation, &["analyze", "analyse", "evaluate", "score", "assess", "review", "rank", "classify"]),
    (Domain::Output, &["write", "save", "send", "publish", "report", "notify", "render", "export"]),
];

/// First matching vocabulary in the description wins
fn domain_of(step: &WorkflowStep) -> Domain {
    let words: Vec<String> = step
        .description
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    VOCABULARY
        .iter()
        .find(|(_, vocabulary)| words.iter().any(|w| vocabulary.contains(&w.as_str())))
        .map(|(domain, _)| *domain)
        .unwrap_or(Domain::General)
}

struct Group {
    name: String,
    members: Vec<usize>,
    isolated: bool,
}

pub fn break_into_specs(workflow: &Workflow) -> Vec<Spec> {
    break_into_specs_with(workflow, &DecompositionConfig::default())
}

pub fn break_into_specs_with(workflow: &Workflow, config: &DecompositionConfig) -> Vec<Spec> {
    if workflow.steps.is_empty() {
        return vec![];
    }

    let mean = workflow.mean_step_cost();
    let is_outlier =
        |step: &WorkflowStep| step.quota_cost > 0.0 && step.quota_cost >= mean * config.outlier_multiple;

    let has_outlier = workflow.steps.iter().any(|step| is_outlier(step));
    if workflow.steps.len() <= config.small_workflow_steps && !has_outlier {
        return vec![];
    }

    let mut groups: Vec<Group> = vec![];
    let mut keyed: HashMap<(StepType, Domain), usize> = HashMap::new();

    for (idx, step) in workflow.steps.iter().enumerate() {
        if is_outlier(step) {
            groups.push(Group {
                name: format!("Isolated: {}", step.id),
                members: vec![idx],
                isolated: true,
            });
            continue;
        }

        let domain = domain_of(step);
        let slot = *keyed.entry((step.step_type, domain)).or_insert_with(|| {
            groups.push(Group {
                name: format!("{} {}", step.step_type.label(), domain.label()),
                members: vec![],
                isolated: false,
            });
            groups.len() - 1
        });
        groups[slot].members.push(idx);
    }

    let groups = merge_singletons(groups, workflow, config);
    let mut groups = split_oversized(groups, config);
    groups.sort_by_key(|group| group.members[0]);

    let specs: Vec<Spec> = groups
        .into_iter()
        .enumerate()
        .map(|(n, group)| {
            let steps: Vec<WorkflowStep> = group
                .members
                .iter()
                .map(|&idx| workflow.steps[idx].clone())
                .collect();
            let estimated_quota_cost = steps.iter().map(|step| step.quota_cost).sum();
            let description = if group.isolated {
                format!(
                    "High-cost step isolated for focused review ({:.1}x mean step cost)",
                    steps[0].quota_cost / mean
                )
            } else {
                format!("{} related steps reviewed as one unit", steps.len())
            };

            Spec {
                id: format!("spec-{}", n + 1),
                name: group.name,
                description,
                steps,
                estimated_quota_cost,
            }
        })
        .collect();

    tracing::debug!(workflow = %workflow.id, specs = specs.len(), "workflow decomposed");

    specs
}

/// Fold undersized non-isolated groups of one step type together
fn merge_singletons(groups: Vec<Group>, workflow: &Workflow, config: &DecompositionConfig) -> Vec<Group> {
    let mut kept: Vec<Group> = vec![];
    let mut small_by_type: HashMap<StepType, usize> = HashMap::new();

    for group in groups {
        if group.isolated || group.members.len() >= config.min_spec_steps {
            kept.push(group);
            continue;
        }

        let step_type = workflow.steps[group.members[0]].step_type;
        match small_by_type.get(&step_type) {
            Some(&slot) => {
                kept[slot].members.extend(group.members);
                kept[slot].members.sort_unstable();
                kept[slot].name = format!("{} Mixed", step_type.label());
            }
            None => {
                small_by_type.insert(step_type, kept.len());
                kept.push(group);
            }
        }
    }

    kept
}

/// Chunk groups larger than `max_spec_steps` into evenly sized parts
fn split_oversized(groups: Vec<Group>, config: &DecompositionConfig) -> Vec<Group> {
    let max = config.max_spec_steps.max(1);
    let mut result = vec![];

    for group in groups {
        if group.members.len() <= max {
            result.push(group);
            continue;
        }

        let parts = group.members.len().div_ceil(max);
        let size = group.members.len().div_ceil(parts);
        for (part, chunk) in group.members.chunks(size).enumerate() {
            result.push(Group {
                name: format!("{} (part {}/{})", group.name, part + 1, parts),
                members: chunk.to_vec(),
                isolated: false,
            });
        }
    }

    result
}
