//! Boundary validation for requests arriving over JSON
//!
//! The analysis functions assume unique ids and non-negative costs; this is
//! where that assumption is checked. All violations are reported together.

use crate::optimizer::{AnalysisRequest, OptimizationError};
use crate::types::{EfficiencyIssue, Workflow};
use std::collections::HashSet;

/// Every structural problem with a workflow, in discovery order
pub fn workflow_violations(workflow: &Workflow) -> Vec<String> {
    let mut violations = vec![];
    let mut seen = HashSet::new();

    for (idx, step) in workflow.steps.iter().enumerate() {
        if step.id.trim().is_empty() {
            violations.push(format!("step #{} has an empty id", idx));
        } else if !seen.insert(step.id.as_str()) {
            violations.push(format!("duplicate step id '{}'", step.id));
        }

        if !step.quota_cost.is_finite() || step.quota_cost < 0.0 {
            violations.push(format!(
                "step '{}' has invalid quota_cost {}",
                step.id, step.quota_cost
            ));
        }
    }

    // finite steps can still sum past f64::MAX
    let steps_finite = workflow.steps.iter().all(|step| step.quota_cost.is_finite());
    if steps_finite && !workflow.total_quota_cost().is_finite() {
        violations.push("total quota_cost is not finite".to_string());
    }

    for edge in &workflow.data_flow {
        for endpoint in [&edge.from, &edge.to] {
            if !seen.contains(endpoint.as_str()) {
                violations.push(format!(
                    "data flow edge {} -> {} references unknown step '{}'",
                    edge.from, edge.to, endpoint
                ));
            }
        }
    }

    violations
}

fn issue_violations(workflow: &Workflow, issues: &[EfficiencyIssue]) -> Vec<String> {
    let known: HashSet<&str> = workflow.steps.iter().map(|step| step.id.as_str()).collect();

    issues
        .iter()
        .enumerate()
        .flat_map(|(idx, issue)| {
            issue
                .steps_affected
                .iter()
                .filter(|id| !known.contains(id.as_str()))
                .map(move |id| format!("issue #{} references unknown step '{}'", idx, id))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn into_result(violations: Vec<String>) -> Result<(), OptimizationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(OptimizationError::InvalidWorkflow(violations.join("; ")))
    }
}

pub fn validate_workflow(workflow: &Workflow) -> Result<(), OptimizationError> {
    into_result(workflow_violations(workflow))
}

pub fn validate_request(request: &AnalysisRequest) -> Result<(), OptimizationError> {
    let mut violations = workflow_violations(&request.workflow);
    violations.extend(issue_violations(&request.workflow, &request.issues));
    into_result(violations)
}
