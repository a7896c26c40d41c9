//! Browser bindings
//!
//! ```javascript
//! import init, { optimize_workflow } from './quota_optimiser.js';
//!
//! await init();
//! const report = JSON.parse(optimize_workflow(JSON.stringify({ workflow, issues })));
//! ```

use wasm_bindgen::prelude::*;

fn to_js(err: crate::OptimizationError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Analyse a workflow request; returns the JSON report
#[wasm_bindgen(js_name = optimize_workflow)]
pub fn optimize_workflow(request_json: &str) -> Result<String, JsValue> {
    crate::optimize_workflow(request_json).map_err(to_js)
}

/// Score techniques for an intent, with optional params JSON
#[wasm_bindgen(js_name = select_techniques)]
pub fn select_techniques(intent_json: &str, params_json: Option<String>) -> Result<String, JsValue> {
    crate::select_techniques_json(intent_json, params_json.as_deref()).map_err(to_js)
}

/// Get list of available techniques and passes
#[wasm_bindgen(js_name = list_techniques)]
pub fn list_techniques() -> String {
    crate::list_techniques_json()
}

/// Percentage of quota saved by identified optimisations
#[wasm_bindgen(js_name = estimate_savings)]
pub fn estimate_savings(request_json: &str) -> Result<f64, JsValue> {
    let request = crate::parse_request(request_json).map_err(to_js)?;
    crate::validate_request(&request).map_err(to_js)?;
    Ok(crate::OptimizerEngine::new().estimate_total_savings(&request))
}
