//! MECE categorisation - groups steps by type into a complete, non-overlapping partition

use crate::types::{Level, StepType, Workflow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeceCategory {
    pub name: String,
    pub step_type: StepType,
    /// Sum of member quota cost
    pub quota_impact: f64,
    /// Member step ids, in workflow order
    pub drivers: Vec<String>,
    pub optimization_potential: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeceAnalysis {
    pub categories: Vec<MeceCategory>,
    /// Always 100: categories partition every step
    pub total_coverage: f64,
}

fn category_name(step_type: StepType) -> &'static str {
    match step_type {
        StepType::Vibe => "Vibe Operations",
        StepType::Spec => "Spec Operations",
        StepType::DataRetrieval => "Data Retrieval",
        StepType::Processing => "Processing Operations",
        StepType::Analysis => "Analysis Operations",
    }
}

/// Free-form steps carry the most latent waste, structured ones the least
fn optimization_potential(step_type: StepType) -> Level {
    match step_type {
        StepType::Vibe => Level::High,
        StepType::DataRetrieval | StepType::Processing => Level::Medium,
        StepType::Spec | StepType::Analysis => Level::Low,
    }
}

pub fn apply_mece(workflow: &Workflow) -> MeceAnalysis {
    let categories = StepType::ALL
        .iter()
        .filter_map(|&step_type| {
            let members: Vec<_> = workflow
                .steps
                .iter()
                .filter(|step| step.step_type == step_type)
                .collect();

            if members.is_empty() {
                return None;
            }

            Some(MeceCategory {
                name: category_name(step_type).to_string(),
                step_type,
                quota_impact: members.iter().map(|step| step.quota_cost).sum(),
                drivers: members.iter().map(|step| step.id.clone()).collect(),
                optimization_potential: optimization_potential(step_type),
            })
        })
        .collect();

    MeceAnalysis {
        categories,
        total_coverage: 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::step;

    #[test]
    fn test_categories_partition_steps() {
        let workflow = Workflow::new(
            "wf",
            vec![
                step("a", StepType::Vibe, "", 10.0),
                step("b", StepType::Spec, "", 2.0),
                step("c", StepType::Vibe, "", 5.0),
                step("d", StepType::DataRetrieval, "", 1.0),
            ],
        );

        let analysis = apply_mece(&workflow);
        assert_eq!(analysis.categories.len(), 3);
        assert_eq!(analysis.total_coverage, 100.0);

        let vibes = &analysis.categories[0];
        assert_eq!(vibes.name, "Vibe Operations");
        assert_eq!(vibes.drivers, vec!["a", "c"]);
        assert_eq!(vibes.quota_impact, 15.0);

        let mut all: Vec<_> = analysis.categories.iter().flat_map(|c| c.drivers.clone()).collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_vibe_potential_exceeds_structured() {
        assert!(optimization_potential(StepType::Vibe) > optimization_potential(StepType::Spec));
        assert!(optimization_potential(StepType::Vibe) > optimization_potential(StepType::Analysis));
    }

    #[test]
    fn test_empty_workflow() {
        let analysis = apply_mece(&Workflow::new("empty", vec![]));
        assert!(analysis.categories.is_empty());
        assert_eq!(analysis.total_coverage, 100.0);
    }
}
