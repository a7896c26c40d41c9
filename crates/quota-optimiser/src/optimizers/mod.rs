//! Optimizer implementations
//!
//! Independent transformation passes over the same workflow.
//! Each pass focuses on a specific optimization pattern.

pub mod batching;
pub mod caching;
pub mod decomposer;
pub mod identifier;

// Re-exports
pub use batching::{apply_batching_strategy, apply_batching_with_min};
pub use caching::{implement_caching_layer, CachingPlan};
pub use decomposer::{break_into_specs, break_into_specs_with};
pub use identifier::{consolidate, identify_optimization_opportunities, identify_with_threshold};
