//! Analysis engine
//!
//! Runs every transformation pass and every selected technique over one
//! request. Each unit is isolated: a panic in one is recorded as a failure
//! and the rest still produce results.

use crate::config::EngineConfig;
use crate::frameworks::{
    apply_impact_effort_matrix, apply_mece, apply_value_driver_tree, apply_zero_based_design,
    generate_option_framing, select_techniques, ImpactEffortMatrix, MeceAnalysis, OptionFraming,
    Technique, TechniqueScore, ValueDriverAnalysis, ZeroBasedDesign,
};
use crate::optimizers::{
    apply_batching_with_min, break_into_specs_with, identify_with_threshold, implement_caching_layer,
    CachingPlan,
};
use crate::types::{
    BatchedOperation, EfficiencyIssue, Optimization, OptionalParams, ParsedIntent, Spec, Workflow,
};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

/// Optimization error types
#[derive(Error, Debug)]
pub enum OptimizationError {
    #[error("Invalid workflow structure: {0}")]
    InvalidWorkflow(String),

    #[error("Failed to parse input: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{technique} failed: {reason}")]
    TechniqueFailed { technique: String, reason: String },
}

/// Everything one analysis run consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub workflow: Workflow,

    #[serde(default)]
    pub issues: Vec<EfficiencyIssue>,

    #[serde(default)]
    pub params: OptionalParams,

    /// Derived from the workflow and issues when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<ParsedIntent>,
}

impl AnalysisRequest {
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            issues: vec![],
            params: OptionalParams::default(),
            intent: None,
        }
    }

    pub fn resolved_intent(&self) -> ParsedIntent {
        self.intent
            .clone()
            .unwrap_or_else(|| ParsedIntent::from_workflow(&self.workflow, &self.issues))
    }
}

/// Results of the selected techniques; unselected or failed ones are `None`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameworkResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mece: Option<MeceAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_driver_tree: Option<ValueDriverAnalysis>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_based: Option<ZeroBasedDesign>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_effort: Option<ImpactEffortMatrix>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_framing: Option<OptionFraming>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub unit: String,
    pub reason: String,
}

impl From<Failure> for OptimizationError {
    fn from(failure: Failure) -> Self {
        OptimizationError::TechniqueFailed {
            technique: failure.unit,
            reason: failure.reason,
        }
    }
}

/// Complete result of an analysis run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub workflow_id: String,
    pub total_quota_cost: f64,
    pub techniques: Vec<TechniqueScore>,
    pub frameworks: FrameworkResults,
    pub optimizations: Vec<Optimization>,
    pub batched_operations: Vec<BatchedOperation>,
    pub caching: CachingPlan,
    pub specs: Vec<Spec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<Failure>,
}

/// Inputs visible to a technique strategy
pub struct TechniqueContext<'a> {
    pub workflow: &'a Workflow,
    pub intent: &'a ParsedIntent,
    pub params: &'a OptionalParams,
    pub optimizations: &'a [Optimization],
}

#[derive(Debug, Clone, PartialEq)]
pub enum TechniqueOutput {
    Mece(MeceAnalysis),
    ValueDriverTree(ValueDriverAnalysis),
    ZeroBased(ZeroBasedDesign),
    ImpactEffort(ImpactEffortMatrix),
    OptionFraming(OptionFraming),
}

pub type Strategy = fn(&TechniqueContext<'_>) -> TechniqueOutput;

fn mece_strategy(ctx: &TechniqueContext<'_>) -> TechniqueOutput {
    TechniqueOutput::Mece(apply_mece(ctx.workflow))
}

fn value_driver_strategy(ctx: &TechniqueContext<'_>) -> TechniqueOutput {
    TechniqueOutput::ValueDriverTree(apply_value_driver_tree(ctx.workflow))
}

fn zero_based_strategy(ctx: &TechniqueContext<'_>) -> TechniqueOutput {
    TechniqueOutput::ZeroBased(apply_zero_based_design(ctx.intent))
}

fn impact_effort_strategy(ctx: &TechniqueContext<'_>) -> TechniqueOutput {
    TechniqueOutput::ImpactEffort(apply_impact_effort_matrix(ctx.optimizations))
}

fn option_framing_strategy(ctx: &TechniqueContext<'_>) -> TechniqueOutput {
    TechniqueOutput::OptionFraming(generate_option_framing(ctx.workflow, Some(ctx.params)))
}

impl Technique {
    /// Static dispatch table
    pub fn strategy(&self) -> Strategy {
        match self {
            Technique::Mece => mece_strategy,
            Technique::ValueDriverTree => value_driver_strategy,
            Technique::ZeroBased => zero_based_strategy,
            Technique::ImpactEffort => impact_effort_strategy,
            Technique::OptionFraming => option_framing_strategy,
        }
    }
}

/// Transformation passes, run for every request
const PASSES: [(&str, &str); 4] = [
    ("optimization_identifier", "Maps efficiency issues and structural patterns to consolidated optimisations"),
    ("batching_strategy", "Groups near-identical steps of one type into batched operations"),
    ("caching_layer", "Selects cacheable steps and assigns keys, TTLs and hit rates"),
    ("spec_decomposer", "Partitions large workflows into bounded, reviewable specs"),
];

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one unit, turning a panic into a recorded failure
fn isolated<T>(unit: &str, failures: &mut Vec<Failure>, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = panic_reason(payload);
            tracing::warn!(unit, %reason, "analysis unit failed; continuing with the rest");
            failures.push(Failure {
                unit: unit.to_string(),
                reason,
            });
            None
        }
    }
}

/// Main engine that coordinates all passes and techniques
#[derive(Debug, Clone, Default)]
pub struct OptimizerEngine {
    config: EngineConfig,
}

impl OptimizerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a request with every pass and every selected technique
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        let workflow = &request.workflow;
        let params = &request.params;
        let intent = request.resolved_intent();
        let mut failures = vec![];

        tracing::debug!(
            workflow = %workflow.id,
            steps = workflow.steps.len(),
            issues = request.issues.len(),
            "analysing workflow"
        );

        let optimizations = isolated(PASSES[0].0, &mut failures, || {
            identify_with_threshold(
                workflow,
                &request.issues,
                Some(params),
                self.config.uniform_type_threshold,
            )
        })
        .unwrap_or_default();

        let batched_operations = isolated(PASSES[1].0, &mut failures, || {
            apply_batching_with_min(workflow, self.config.min_batch_size)
        })
        .unwrap_or_default();

        let caching = isolated(PASSES[2].0, &mut failures, || implement_caching_layer(workflow))
            .unwrap_or_default();

        let specs = isolated(PASSES[3].0, &mut failures, || {
            break_into_specs_with(workflow, &self.config.decomposition)
        })
        .unwrap_or_default();

        let techniques = select_techniques(&intent, Some(params));
        let ctx = TechniqueContext {
            workflow,
            intent: &intent,
            params,
            optimizations: &optimizations,
        };

        let mut frameworks = FrameworkResults::default();
        for score in &techniques {
            let strategy = score.technique.strategy();
            match isolated(score.technique.name(), &mut failures, || strategy(&ctx)) {
                Some(TechniqueOutput::Mece(result)) => frameworks.mece = Some(result),
                Some(TechniqueOutput::ValueDriverTree(result)) => frameworks.value_driver_tree = Some(result),
                Some(TechniqueOutput::ZeroBased(result)) => frameworks.zero_based = Some(result),
                Some(TechniqueOutput::ImpactEffort(result)) => frameworks.impact_effort = Some(result),
                Some(TechniqueOutput::OptionFraming(result)) => frameworks.option_framing = Some(result),
                None => {}
            }
        }

        AnalysisReport {
            workflow_id: workflow.id.clone(),
            total_quota_cost: workflow.total_quota_cost(),
            techniques,
            frameworks,
            optimizations,
            batched_operations,
            caching,
            specs,
            failures,
        }
    }

    /// Run a single technique regardless of selection
    pub fn run_technique(
        &self,
        technique: Technique,
        request: &AnalysisRequest,
    ) -> Result<TechniqueOutput, OptimizationError> {
        let intent = request.resolved_intent();
        let optimizations = identify_with_threshold(
            &request.workflow,
            &request.issues,
            Some(&request.params),
            self.config.uniform_type_threshold,
        );
        let ctx = TechniqueContext {
            workflow: &request.workflow,
            intent: &intent,
            params: &request.params,
            optimizations: &optimizations,
        };

        let mut failures = vec![];
        let strategy = technique.strategy();
        match isolated(technique.name(), &mut failures, || strategy(&ctx)) {
            Some(output) => Ok(output),
            None => Err(failures.remove(0).into()),
        }
    }

    /// Get list of all techniques and passes
    pub fn list_techniques(&self) -> Vec<(String, String)> {
        Technique::ALL
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .chain(PASSES.iter().map(|(id, desc)| (id.to_string(), desc.to_string())))
            .collect()
    }

    /// Percentage of total quota cost saved by the identified optimisations, capped at 100
    pub fn estimate_total_savings(&self, request: &AnalysisRequest) -> f64 {
        let total = request.workflow.total_quota_cost();
        if total <= 0.0 {
            return 0.0;
        }

        let saved: f64 = identify_with_threshold(
            &request.workflow,
            &request.issues,
            Some(&request.params),
            self.config.uniform_type_threshold,
        )
        .iter()
        .map(|o| o.estimated_savings.vibes)
        .sum();

        (saved / total * 100.0).clamp(0.0, 100.0)
    }
}
