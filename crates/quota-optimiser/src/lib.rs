//! Workflow Quota Optimiser
//!
//! Analyses a workflow of typed, quota-costed steps and produces optimisation
//! recommendations: structured frameworks (MECE, value drivers, zero-based
//! redesign, impact/effort, option framing) plus batching, caching and
//! decomposition passes. Every function is pure; nothing is persisted.
//!
//! # Example
//! ```rust,ignore
//! use quota_optimiser::{AnalysisRequest, OptimizerEngine, Workflow};
//!
//! let workflow: Workflow = serde_json::from_str(json)?;
//! let report = OptimizerEngine::new().analyze(&AnalysisRequest::new(workflow));
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

use serde::{Deserialize, Serialize};

// Module declarations
pub mod adjust;
pub mod config;
pub mod frameworks;
pub mod optimizer;
pub mod optimizers;
pub mod types;
pub mod validation;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use config::{DecompositionConfig, EngineConfig};
pub use frameworks::{Technique, TechniqueScore};
pub use optimizer::{AnalysisReport, AnalysisRequest, OptimizationError, OptimizerEngine};
pub use types::{
    EfficiencyIssue, Level, Optimization, OptimizationType, OptionalParams, ParsedIntent, StepType,
    Workflow, WorkflowStep,
};
pub use validation::{validate_request, validate_workflow, workflow_violations};

/// Analyse a JSON request and return the JSON report
///
/// # Arguments
/// * `request_json` - JSON of an [`AnalysisRequest`]; a bare workflow object is
///   also accepted
///
/// # Returns
/// Pretty-printed [`AnalysisReport`]
pub fn optimize_workflow(request_json: &str) -> Result<String, OptimizationError> {
    let request = parse_request(request_json)?;
    validate_request(&request)?;

    let report = OptimizerEngine::new().analyze(&request);
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Score techniques for a JSON intent and optional JSON params
pub fn select_techniques_json(intent_json: &str, params_json: Option<&str>) -> Result<String, OptimizationError> {
    let intent: ParsedIntent = serde_json::from_str(intent_json)?;
    let params: Option<OptionalParams> = params_json.map(serde_json::from_str::<OptionalParams>).transpose()?;

    let scores = frameworks::select_techniques(&intent, params.as_ref());
    Ok(serde_json::to_string_pretty(&scores)?)
}

/// Get list of available techniques and passes with descriptions
pub fn list_techniques_json() -> String {
    let listed: Vec<_> = OptimizerEngine::new()
        .list_techniques()
        .into_iter()
        .map(|(id, description)| TechniqueInfo { id, description })
        .collect();

    serde_json::to_string_pretty(&listed).unwrap_or_else(|_| "[]".to_string())
}

/// Accept either a full request or a bare workflow
pub fn parse_request(json: &str) -> Result<AnalysisRequest, OptimizationError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("workflow").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(AnalysisRequest::new(serde_json::from_value(value)?))
    }
}

#[derive(Serialize, Deserialize)]
struct TechniqueInfo {
    id: String,
    description: String,
}
