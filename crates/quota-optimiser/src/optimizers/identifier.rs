//! Optimisation Identifier
//!
//! **Purpose**: Turn detected efficiency issues and structural patterns into
//! typed optimisations with quota savings estimates.
//!
//! # Issue mapping
//! - `redundant_query` → caching (25%)
//! - `excessive_loops` → batching (50%)
//! - `unnecessary_vibes` → vibe_to_spec (25% of the vibe share, +1 spec)
//!
//! # Structural detection
//! - More than `uniform_type_threshold` steps of one type → decomposition (15%)
//! - Two or more data retrievals with identical inputs → caching
//!
//! Savings are scaled by [`crate::adjust`] policies, then overlapping or
//! adjacent findings of the same type are merged by [`consolidate`].

use crate::adjust::{adjust_all, policies_for};
use crate::types::{
    EfficiencyIssue, EstimatedSavings, IssueType, Optimization, OptimizationType, OptionalParams,
    StepType, Workflow,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_UNIFORM_TYPE_THRESHOLD: usize = 10;

/// Fraction of the affected steps' cost saved, before adjustments
pub fn base_rate(optimization_type: OptimizationType) -> f64 {
    match optimization_type {
        OptimizationType::Caching => 0.25,
        OptimizationType::Batching => 0.5,
        OptimizationType::VibeToSpec => 0.25,
        OptimizationType::Decomposition => 0.15,
    }
}

fn optimization_type_for(issue_type: IssueType) -> Option<OptimizationType> {
    match issue_type {
        IssueType::RedundantQuery => Some(OptimizationType::Caching),
        IssueType::ExcessiveLoops => Some(OptimizationType::Batching),
        IssueType::UnnecessaryVibes => Some(OptimizationType::VibeToSpec),
        IssueType::Other => None,
    }
}

/// Savings for a set of steps, including parameter adjustments
pub fn estimate_savings(
    optimization_type: OptimizationType,
    steps: &[String],
    workflow: &Workflow,
    params: &OptionalParams,
) -> EstimatedSavings {
    let rate = base_rate(optimization_type);
    let base = match optimization_type {
        OptimizationType::VibeToSpec => {
            let vibe_steps: Vec<_> = steps
                .iter()
                .filter_map(|id| workflow.get_step(id))
                .filter(|step| step.step_type == StepType::Vibe)
                .collect();
            let vibe_cost: f64 = vibe_steps.iter().map(|step| step.quota_cost).sum();
            let affected_cost = workflow.cost_of(steps);

            // only the vibe share of the affected cost converts
            let vibe_share = if affected_cost > 0.0 {
                vibe_cost / affected_cost
            } else if vibe_steps.is_empty() {
                0.0
            } else {
                1.0
            };

            EstimatedSavings {
                vibes: vibe_cost * rate,
                specs: if vibe_steps.is_empty() { 0.0 } else { 1.0 },
                percentage: rate * 100.0 * vibe_share,
            }
        }
        _ => EstimatedSavings {
            vibes: workflow.cost_of(steps) * rate,
            specs: 0.0,
            percentage: rate * 100.0,
        },
    };

    adjust_all(base, &policies_for(optimization_type, params))
}

fn describe(optimization_type: OptimizationType, steps: &[String]) -> String {
    let list = steps.join(", ");
    match optimization_type {
        OptimizationType::Caching => format!("Cache repeated results of {}", list),
        OptimizationType::Batching => format!("Batch repeated executions of {}", list),
        OptimizationType::VibeToSpec => format!("Convert vibe steps {} into structured specs", list),
        OptimizationType::Decomposition => format!("Decompose {} into smaller reviewable specs", list),
    }
}

/// Keep only known step ids, deduplicated, in workflow order
fn known_steps(workflow: &Workflow, ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let positions = workflow.positions();
    ids.into_iter()
        .filter_map(|id| positions.get(id.as_str()).map(|&pos| (pos, id)))
        .collect::<BTreeMap<usize, String>>()
        .into_values()
        .collect()
}

fn build(
    optimization_type: OptimizationType,
    description: String,
    steps: Vec<String>,
    workflow: &Workflow,
    params: &OptionalParams,
) -> Optimization {
    Optimization {
        optimization_type,
        estimated_savings: estimate_savings(optimization_type, &steps, workflow, params),
        description,
        steps_affected: steps,
        effort: None,
    }
}

fn from_issues(workflow: &Workflow, issues: &[EfficiencyIssue], params: &OptionalParams) -> Vec<Optimization> {
    issues
        .iter()
        .filter_map(|issue| {
            let optimization_type = optimization_type_for(issue.issue_type)?;
            let steps = known_steps(workflow, issue.steps_affected.iter().cloned());
            if steps.is_empty() {
                return None;
            }
            let description = if issue.suggested_fix.is_empty() {
                describe(optimization_type, &steps)
            } else {
                issue.suggested_fix.clone()
            };
            Some(build(optimization_type, description, steps, workflow, params))
        })
        .collect()
}

fn structural(workflow: &Workflow, params: &OptionalParams, uniform_type_threshold: usize) -> Vec<Optimization> {
    let mut found = vec![];

    for (step_type, count) in workflow.step_count_by_type() {
        if count > uniform_type_threshold {
            let steps = known_steps(
                workflow,
                workflow
                    .steps
                    .iter()
                    .filter(|step| step.step_type == step_type)
                    .map(|step| step.id.clone()),
            );
            found.push(build(
                OptimizationType::Decomposition,
                format!(
                    "Decompose {} uniform {} steps into smaller reviewable specs",
                    count,
                    step_type.as_str()
                ),
                steps,
                workflow,
                params,
            ));
        }
    }

    let mut by_inputs: BTreeMap<&BTreeSet<String>, Vec<String>> = BTreeMap::new();
    for step in &workflow.steps {
        if step.step_type == StepType::DataRetrieval && !step.inputs.is_empty() {
            by_inputs.entry(&step.inputs).or_default().push(step.id.clone());
        }
    }
    for (_, ids) in by_inputs {
        if ids.len() >= 2 {
            let steps = known_steps(workflow, ids);
            found.push(build(
                OptimizationType::Caching,
                describe(OptimizationType::Caching, &steps),
                steps,
                workflow,
                params,
            ));
        }
    }

    found
}

/// Issue-driven and structural optimisations, consolidated
pub fn identify_optimization_opportunities(
    workflow: &Workflow,
    issues: &[EfficiencyIssue],
    params: Option<&OptionalParams>,
) -> Vec<Optimization> {
    identify_with_threshold(workflow, issues, params, DEFAULT_UNIFORM_TYPE_THRESHOLD)
}

pub fn identify_with_threshold(
    workflow: &Workflow,
    issues: &[EfficiencyIssue],
    params: Option<&OptionalParams>,
    uniform_type_threshold: usize,
) -> Vec<Optimization> {
    let params = params.copied().unwrap_or_default();
    let mut found = from_issues(workflow, issues, &params);
    found.extend(structural(workflow, &params, uniform_type_threshold));

    tracing::debug!(
        workflow = %workflow.id,
        findings = found.len(),
        "identified optimisation candidates"
    );

    consolidate(found, workflow, &params)
}

fn touches(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> bool {
    a.iter()
        .any(|&pos| b.contains(&pos) || b.contains(&(pos + 1)) || (pos > 0 && b.contains(&(pos - 1))))
}

/// Merge same-type optimisations whose steps overlap or sit next to each other.
///
/// Groups by type, then union-merges step sets until no two clusters of a
/// type touch. Merged savings are recomputed from the union.
pub fn consolidate(
    optimizations: Vec<Optimization>,
    workflow: &Workflow,
    params: &OptionalParams,
) -> Vec<Optimization> {
    let positions = workflow.positions();

    // type -> clusters of (positions, member optimisations)
    let mut type_order: Vec<OptimizationType> = vec![];
    let mut groups: HashMap<OptimizationType, Vec<(BTreeSet<usize>, Vec<Optimization>)>> = HashMap::new();

    for optimization in optimizations {
        let optimization_type = optimization.optimization_type;
        if !type_order.contains(&optimization_type) {
            type_order.push(optimization_type);
        }

        let mut cluster_positions: BTreeSet<usize> = optimization
            .steps_affected
            .iter()
            .filter_map(|id| positions.get(id.as_str()).copied())
            .collect();
        let mut members = vec![optimization];

        let clusters = groups.entry(optimization_type).or_default();
        let (touching, mut rest): (Vec<_>, Vec<_>) = clusters
            .drain(..)
            .partition(|(existing, _)| touches(existing, &cluster_positions));

        for (existing, existing_members) in touching {
            cluster_positions.extend(existing);
            members.extend(existing_members);
        }

        rest.push((cluster_positions, members));
        *clusters = rest;
    }

    let mut consolidated = vec![];
    for optimization_type in type_order {
        let mut clusters = groups.remove(&optimization_type).unwrap_or_default();
        clusters.sort_by_key(|(cluster_positions, _)| cluster_positions.iter().next().copied());

        for (cluster_positions, mut members) in clusters {
            if members.len() == 1 {
                consolidated.extend(members.pop());
                continue;
            }

            let steps: Vec<String> = cluster_positions
                .iter()
                .map(|&pos| workflow.steps[pos].id.clone())
                .collect();
            let effort = members.iter().filter_map(|m| m.effort).max();
            let mut merged = build(
                optimization_type,
                format!(
                    "{} (consolidated from {} findings)",
                    describe(optimization_type, &steps),
                    members.len()
                ),
                steps,
                workflow,
                params,
            );
            merged.effort = effort;
            consolidated.push(merged);
        }
    }

    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::step;
    use crate::types::{CostConstraints, Level};

    fn issue(issue_type: IssueType, steps: &[&str]) -> EfficiencyIssue {
        EfficiencyIssue {
            issue_type,
            severity: Level::Medium,
            description: String::new(),
            suggested_fix: String::new(),
            steps_affected: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn vibes(n: usize, cost: f64) -> Workflow {
        Workflow::new(
            "wf",
            (0..n)
                .map(|i| step(&format!("v{}", i), StepType::Vibe, "draft reply", cost))
                .collect(),
        )
    }

    #[test]
    fn test_excessive_loops_become_batching() {
        let workflow = vibes(3, 10.0);
        let found = identify_optimization_opportunities(
            &workflow,
            &[issue(IssueType::ExcessiveLoops, &["v0", "v1", "v2"])],
            None,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].optimization_type, OptimizationType::Batching);
        assert_eq!(found[0].estimated_savings.vibes, 15.0);
        assert_eq!(found[0].estimated_savings.percentage, 50.0);
    }

    #[test]
    fn test_redundant_query_becomes_caching() {
        let workflow = vibes(2, 10.0);
        let found = identify_optimization_opportunities(
            &workflow,
            &[issue(IssueType::RedundantQuery, &["v0", "v1"])],
            None,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].optimization_type, OptimizationType::Caching);
        assert_eq!(found[0].estimated_savings.vibes, 5.0);
        assert_eq!(found[0].estimated_savings.percentage, 25.0);
    }

    #[test]
    fn test_unnecessary_vibes_gain_a_spec() {
        let workflow = vibes(2, 8.0);
        let found = identify_optimization_opportunities(
            &workflow,
            &[issue(IssueType::UnnecessaryVibes, &["v1"])],
            None,
        );

        assert_eq!(found[0].optimization_type, OptimizationType::VibeToSpec);
        assert_eq!(found[0].estimated_savings.vibes, 2.0);
        assert_eq!(found[0].estimated_savings.specs, 1.0);
    }

    #[test]
    fn test_vibe_to_spec_scales_with_vibe_share() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("v", StepType::Vibe, "draft reply", 10.0),
                step("p", StepType::Processing, "parse reply", 30.0),
                step("s", StepType::Spec, "send reply", 5.0),
            ],
        );

        let mixed = identify_optimization_opportunities(
            &workflow,
            &[issue(IssueType::UnnecessaryVibes, &["v", "p"])],
            None,
        );
        assert_eq!(mixed[0].estimated_savings.vibes, 2.5);
        assert_eq!(mixed[0].estimated_savings.percentage, 6.25);

        let no_vibes = identify_optimization_opportunities(
            &workflow,
            &[issue(IssueType::UnnecessaryVibes, &["s"])],
            None,
        );
        assert_eq!(no_vibes[0].estimated_savings.vibes, 0.0);
        assert_eq!(no_vibes[0].estimated_savings.specs, 0.0);
        assert_eq!(no_vibes[0].estimated_savings.percentage, 0.0);
    }

    #[test]
    fn test_unknown_steps_and_issue_types_are_dropped() {
        let workflow = vibes(2, 10.0);
        let found = identify_optimization_opportunities(
            &workflow,
            &[
                issue(IssueType::RedundantQuery, &["missing"]),
                issue(IssueType::Other, &["v0"]),
                issue(IssueType::ExcessiveLoops, &["v0", "ghost"]),
            ],
            None,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].steps_affected, vec!["v0"]);
    }

    #[test]
    fn test_uniform_workflow_triggers_decomposition() {
        let workflow = vibes(11, 10.0);
        let found = identify_optimization_opportunities(&workflow, &[], None);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].optimization_type, OptimizationType::Decomposition);
        assert_eq!(found[0].steps_affected.len(), 11);
        assert_eq!(found[0].estimated_savings.percentage, 15.0);
    }

    #[test]
    fn test_repeated_retrieval_inputs_trigger_caching() {
        let mut a = step("a", StepType::DataRetrieval, "fetch user", 4.0);
        let mut b = step("b", StepType::DataRetrieval, "fetch user again", 4.0);
        a.inputs.insert("user_id".to_string());
        b.inputs.insert("user_id".to_string());
        let workflow = Workflow::new("wf", vec![a, step("x", StepType::Spec, "", 1.0), b]);

        let found = identify_optimization_opportunities(&workflow, &[], None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].optimization_type, OptimizationType::Caching);
        assert_eq!(found[0].estimated_savings.vibes, 2.0);
    }

    #[test]
    fn test_overlapping_and_adjacent_are_merged() {
        let workflow = vibes(6, 10.0);
        let found = identify_optimization_opportunities(
            &workflow,
            &[
                issue(IssueType::RedundantQuery, &["v0", "v1"]),
                issue(IssueType::RedundantQuery, &["v2"]),
                issue(IssueType::RedundantQuery, &["v5"]),
                issue(IssueType::ExcessiveLoops, &["v1", "v2"]),
            ],
            None,
        );

        let caching: Vec<_> = found
            .iter()
            .filter(|o| o.optimization_type == OptimizationType::Caching)
            .collect();
        assert_eq!(caching.len(), 2);
        assert_eq!(caching[0].steps_affected, vec!["v0", "v1", "v2"]);
        assert_eq!(caching[0].estimated_savings.vibes, 7.5);
        assert_eq!(caching[1].steps_affected, vec!["v5"]);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_merge_is_transitive() {
        let workflow = vibes(5, 10.0);
        let found = identify_optimization_opportunities(
            &workflow,
            &[
                issue(IssueType::ExcessiveLoops, &["v0"]),
                issue(IssueType::ExcessiveLoops, &["v4"]),
                issue(IssueType::ExcessiveLoops, &["v2"]),
                issue(IssueType::ExcessiveLoops, &["v1", "v3"]),
            ],
            None,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].steps_affected.len(), 5);
        assert_eq!(found[0].estimated_savings.vibes, 25.0);
    }

    #[test]
    fn test_tight_budget_scales_savings() {
        let workflow = vibes(2, 10.0);
        let params = OptionalParams {
            cost_constraints: Some(CostConstraints {
                max_vibes: Some(10.0),
                max_cost_dollars: None,
            }),
            ..Default::default()
        };
        let issues = [issue(IssueType::RedundantQuery, &["v0", "v1"])];

        let base = identify_optimization_opportunities(&workflow, &issues, None);
        let tight = identify_optimization_opportunities(&workflow, &issues, Some(&params));
        assert!(tight[0].estimated_savings.vibes > base[0].estimated_savings.vibes);
        assert!(tight[0].estimated_savings.percentage <= 100.0);
    }

    #[test]
    fn test_empty_workflow() {
        let workflow = Workflow::new("empty", vec![]);
        assert!(identify_optimization_opportunities(&workflow, &[], None).is_empty());
    }
}
