//! End-to-end behaviour of the engine and its JSON boundary

use quota_optimiser::frameworks::{apply_mece, generate_option_framing, select_techniques, Technique};
use quota_optimiser::optimizers::{
    apply_batching_strategy, break_into_specs, identify_optimization_opportunities,
    implement_caching_layer,
};
use quota_optimiser::types::{CostConstraints, IssueType, Level, OptionalParams, StepType};
use quota_optimiser::{
    optimize_workflow, select_techniques_json, AnalysisReport, AnalysisRequest, EfficiencyIssue,
    OptimizationType, OptimizerEngine, Workflow, WorkflowStep,
};

fn step(id: &str, step_type: StepType, description: &str, cost: f64) -> WorkflowStep {
    WorkflowStep {
        id: id.to_string(),
        step_type,
        description: description.to_string(),
        inputs: Default::default(),
        outputs: Default::default(),
        quota_cost: cost,
    }
}

fn issue(issue_type: IssueType, steps: &[&str]) -> EfficiencyIssue {
    EfficiencyIssue {
        issue_type,
        severity: Level::Medium,
        description: "detected".to_string(),
        suggested_fix: String::new(),
        steps_affected: steps.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn three_looping_vibes_batch_to_fifteen() {
    let workflow = Workflow::new(
        "loops",
        vec![
            step("a", StepType::Vibe, "draft", 10.0),
            step("b", StepType::Vibe, "draft", 10.0),
            step("c", StepType::Vibe, "draft", 10.0),
        ],
    );

    let found = identify_optimization_opportunities(
        &workflow,
        &[issue(IssueType::ExcessiveLoops, &["a", "b", "c"])],
        None,
    );

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].optimization_type, OptimizationType::Batching);
    assert_eq!(found[0].estimated_savings.vibes, 15.0);
    assert_eq!(found[0].estimated_savings.percentage, 50.0);
}

#[test]
fn two_redundant_vibes_cache_to_five() {
    let workflow = Workflow::new(
        "redundant",
        vec![
            step("a", StepType::Vibe, "draft", 10.0),
            step("b", StepType::Vibe, "draft", 10.0),
        ],
    );

    let found = identify_optimization_opportunities(
        &workflow,
        &[issue(IssueType::RedundantQuery, &["a", "b"])],
        None,
    );

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].optimization_type, OptimizationType::Caching);
    assert_eq!(found[0].estimated_savings.vibes, 5.0);
    assert_eq!(found[0].estimated_savings.percentage, 25.0);
}

#[test]
fn empty_workflow_yields_empty_results() {
    let workflow = Workflow::new("empty", vec![]);

    let mece = apply_mece(&workflow);
    assert!(mece.categories.is_empty());
    assert_eq!(mece.total_coverage, 100.0);
    assert!(identify_optimization_opportunities(&workflow, &[], None).is_empty());
    assert!(break_into_specs(&workflow).is_empty());
    assert!(implement_caching_layer(&workflow).cache_points.is_empty());
    assert!(apply_batching_strategy(&workflow).is_empty());

    let report = OptimizerEngine::new().analyze(&AnalysisRequest::new(workflow));
    assert!(report.failures.is_empty());
    assert_eq!(report.total_quota_cost, 0.0);
}

#[test]
fn constraints_shape_the_whole_report() {
    let mut steps: Vec<WorkflowStep> = (0..12)
        .map(|i| step(&format!("fetch_{}", i), StepType::DataRetrieval, &format!("Fetch page {}", i), 3.0))
        .collect();
    steps.push(step("essay", StepType::Vibe, "Write the final essay", 80.0));
    let workflow = Workflow::new("crawler", steps);

    let mut request = AnalysisRequest::new(workflow);
    request.params = OptionalParams {
        expected_user_volume: Some(50_000),
        cost_constraints: Some(CostConstraints {
            max_vibes: Some(40.0),
            max_cost_dollars: None,
        }),
        performance_sensitivity: Some(Level::High),
    };
    request.issues.push(issue(IssueType::RedundantQuery, &["fetch_0", "fetch_1"]));

    let report = OptimizerEngine::new().analyze(&request);
    assert!(report.failures.is_empty());

    let selected: Vec<Technique> = report.techniques.iter().map(|t| t.technique).collect();
    assert!(selected.contains(&Technique::ZeroBased));
    assert!(selected.contains(&Technique::ImpactEffort));
    assert!(report.frameworks.zero_based.is_some());
    assert!(report.frameworks.impact_effort.is_some());

    assert!(report
        .optimizations
        .iter()
        .any(|o| o.optimization_type == OptimizationType::Decomposition));
    let caching = report
        .optimizations
        .iter()
        .find(|o| o.optimization_type == OptimizationType::Caching)
        .unwrap();
    assert!(caching.estimated_savings.vibes > 6.0 * 0.25);

    assert_eq!(report.batched_operations.len(), 1);
    assert_eq!(report.batched_operations[0].batch_size, 12);

    assert!(report.specs.iter().any(|s| s.steps.len() == 1 && s.steps[0].id == "essay"));

    let framing = report.frameworks.option_framing.unwrap();
    assert!(framing.conservative.summary.contains("cost reduction"));
    assert_eq!(framing.balanced.effort, Level::High);
}

#[test]
fn json_round_trip_through_engine() {
    let json = r#"{
        "workflow": {
            "id": "support",
            "steps": [
                {"id": "cfg", "type": "data_retrieval", "description": "Load routing config", "inputs": ["team"], "quota_cost": 1},
                {"id": "t1", "type": "vibe", "description": "Summarise ticket 11", "quota_cost": 10},
                {"id": "t2", "type": "vibe", "description": "Summarise ticket 12", "quota_cost": 10},
                {"id": "t3", "type": "vibe", "description": "Summarise ticket 13", "quota_cost": 10},
                {"id": "reply", "type": "spec", "description": "Send reply", "quota_cost": 2}
            ],
            "data_flow": [
                {"from": "cfg", "to": "t1", "data_type": "json"},
                {"from": "t3", "to": "reply", "data_type": "text"}
            ]
        },
        "issues": [
            {"type": "unnecessary_vibes", "severity": "high", "steps_affected": ["t1", "t2"]}
        ],
        "params": {"performance_sensitivity": "high"}
    }"#;

    let report: AnalysisReport = serde_json::from_str(&optimize_workflow(json).unwrap()).unwrap();
    assert_eq!(report.workflow_id, "support");
    assert_eq!(report.optimizations[0].optimization_type, OptimizationType::VibeToSpec);
    assert!(report.optimizations[0].estimated_savings.vibes > 5.0);

    let cfg = report
        .caching
        .cache_points
        .iter()
        .find(|p| p.step_id == "cfg")
        .unwrap();
    assert_eq!(cfg.ttl, 3600);
    assert_eq!(cfg.cache_key, "data_retrieval:team");
    assert!(report.caching.cache_points.iter().all(|p| p.step_id != "reply"));
}

#[test]
fn technique_selection_over_json() {
    let intent = r#"{"business_goal": "triage", "technical_requirements": ["a","b","c","d","e","f"]}"#;
    let scores: Vec<serde_json::Value> =
        serde_json::from_str(&select_techniques_json(intent, Some(r#"{"expected_user_volume": 5000}"#)).unwrap())
            .unwrap();

    assert_eq!(scores[0]["technique"], "MECE");
    assert!(scores.iter().any(|s| s["technique"] == "ImpactEffort"));

    let direct = select_techniques(&Default::default(), None);
    assert_eq!(direct.len(), 2);
}

#[test]
fn option_framing_scales_with_cost() {
    let small = Workflow::new("s", vec![step("a", StepType::Vibe, "", 10.0)]);
    let large = Workflow::new("l", vec![step("a", StepType::Vibe, "", 100.0)]);

    let small = generate_option_framing(&small, None);
    let large = generate_option_framing(&large, None);
    assert!(large.bold.quota_savings > small.bold.quota_savings);
    assert_eq!(large.conservative.estimated_roi, small.conservative.estimated_roi);
}
