//! Value driver tree
//!
//! Ranks steps by quota cost. The most expensive fifth (at least one step)
//! become primary drivers, the rest secondary. Root causes are inferred from
//! structural ratios of the workflow.

use crate::types::{StepType, Workflow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDriver {
    pub step_id: String,
    pub description: String,
    pub current_cost: f64,
    pub savings_potential: f64,
    pub optimized_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueDriverAnalysis {
    pub primary_drivers: Vec<ValueDriver>,
    pub secondary_drivers: Vec<ValueDriver>,
    pub root_causes: Vec<String>,
}

const PRIMARY_SHARE: f64 = 0.2;
const MIN_STEPS_FOR_ROOT_CAUSES: usize = 3;
const VIBE_RATIO_THRESHOLD: f64 = 0.5;
const EDGES_PER_STEP_THRESHOLD: f64 = 1.5;
const COST_CONCENTRATION_THRESHOLD: f64 = 0.5;
const LONG_WORKFLOW_STEPS: usize = 20;

/// Fraction of a step's cost that optimisation can typically recover
pub fn savings_rate(step_type: StepType) -> f64 {
    match step_type {
        StepType::Vibe => 0.4,
        StepType::DataRetrieval => 0.3,
        StepType::Analysis => 0.25,
        StepType::Processing => 0.2,
        StepType::Spec => 0.15,
    }
}

pub fn apply_value_driver_tree(workflow: &Workflow) -> ValueDriverAnalysis {
    let mut ranked: Vec<_> = workflow.steps.iter().collect();
    ranked.sort_by(|a, b| b.quota_cost.total_cmp(&a.quota_cost));

    let mut drivers: Vec<ValueDriver> = ranked
        .into_iter()
        .map(|step| {
            let savings_potential = step.quota_cost * savings_rate(step.step_type);
            ValueDriver {
                step_id: step.id.clone(),
                description: step.description.clone(),
                current_cost: step.quota_cost,
                savings_potential,
                optimized_cost: step.quota_cost - savings_potential,
            }
        })
        .collect();

    let primary_count = if drivers.is_empty() {
        0
    } else {
        ((drivers.len() as f64 * PRIMARY_SHARE).ceil() as usize).max(1)
    };
    let secondary_drivers = drivers.split_off(primary_count);

    ValueDriverAnalysis {
        primary_drivers: drivers,
        secondary_drivers,
        root_causes: infer_root_causes(workflow),
    }
}

fn infer_root_causes(workflow: &Workflow) -> Vec<String> {
    let step_count = workflow.steps.len();
    let mut causes = vec![];

    if step_count < MIN_STEPS_FOR_ROOT_CAUSES {
        return causes;
    }

    let vibe_count = workflow
        .steps
        .iter()
        .filter(|step| step.step_type == StepType::Vibe)
        .count();
    let vibe_ratio = vibe_count as f64 / step_count as f64;
    if vibe_ratio > VIBE_RATIO_THRESHOLD {
        causes.push(format!(
            "High proportion of vibe operations ({:.0}% of steps) relies on unstructured model calls",
            vibe_ratio * 100.0
        ));
    }

    let edge_count = workflow.data_flow.len();
    if edge_count as f64 > step_count as f64 * EDGES_PER_STEP_THRESHOLD {
        causes.push(format!(
            "Complex data flow: {} edges across {} steps adds coordination overhead",
            edge_count, step_count
        ));
    }

    if workflow.has_cyclic_data_flow() {
        causes.push("Circular data dependencies force repeated re-computation".to_string());
    }

    let total = workflow.total_quota_cost();
    if total > 0.0 {
        if let Some(heaviest) = workflow
            .steps
            .iter()
            .max_by(|a, b| a.quota_cost.total_cmp(&b.quota_cost))
        {
            let share = heaviest.quota_cost / total;
            if share > COST_CONCENTRATION_THRESHOLD {
                causes.push(format!(
                    "Quota cost concentrated in step '{}' ({:.0}% of total)",
                    heaviest.id,
                    share * 100.0
                ));
            }
        }
    }

    if step_count > LONG_WORKFLOW_STEPS {
        causes.push(format!(
            "Long workflow of {} steps without intermediate checkpoints",
            step_count
        ));
    }

    causes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::{edge, step};

    #[test]
    fn test_drivers_ranked_by_cost() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("cheap", StepType::Spec, "", 1.0),
                step("big", StepType::Vibe, "", 50.0),
                step("mid", StepType::Processing, "", 10.0),
                step("small", StepType::Analysis, "", 2.0),
                step("tiny", StepType::Spec, "", 0.5),
            ],
        );

        let analysis = apply_value_driver_tree(&workflow);
        assert_eq!(analysis.primary_drivers.len(), 1);
        assert_eq!(analysis.primary_drivers[0].step_id, "big");
        assert_eq!(analysis.primary_drivers[0].savings_potential, 20.0);
        assert_eq!(analysis.primary_drivers[0].optimized_cost, 30.0);
        assert_eq!(analysis.secondary_drivers.len(), 4);

        let min_primary = analysis
            .primary_drivers
            .iter()
            .map(|d| d.current_cost)
            .fold(f64::INFINITY, f64::min);
        assert!(analysis.secondary_drivers.iter().all(|d| d.current_cost <= min_primary));
        assert!(analysis
            .primary_drivers
            .iter()
            .chain(&analysis.secondary_drivers)
            .all(|d| d.optimized_cost < d.current_cost));
    }

    #[test]
    fn test_vibe_rate_exceeds_structured() {
        assert!(savings_rate(StepType::Vibe) > savings_rate(StepType::Spec));
        assert!(savings_rate(StepType::Vibe) > savings_rate(StepType::Processing));
    }

    #[test]
    fn test_simple_workflow_has_no_root_causes() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("a", StepType::Spec, "", 2.0),
                step("b", StepType::Processing, "", 2.0),
            ],
        );
        assert!(apply_value_driver_tree(&workflow).root_causes.is_empty());
    }

    #[test]
    fn test_structural_root_causes() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("a", StepType::Vibe, "", 5.0),
                step("b", StepType::Vibe, "", 5.0),
                step("c", StepType::Spec, "", 5.0),
            ],
        )
        .with_data_flow(vec![
            edge("a", "b"),
            edge("b", "c"),
            edge("c", "a"),
            edge("a", "c"),
            edge("b", "a"),
        ]);

        let causes = apply_value_driver_tree(&workflow).root_causes;
        assert!(causes.iter().any(|c| c.contains("vibe operations")));
        assert!(causes.iter().any(|c| c.contains("5 edges")));
        assert!(causes.iter().any(|c| c.contains("Circular")));
    }

    #[test]
    fn test_empty_workflow() {
        let analysis = apply_value_driver_tree(&Workflow::new("empty", vec![]));
        assert_eq!(analysis, ValueDriverAnalysis::default());
    }
}
