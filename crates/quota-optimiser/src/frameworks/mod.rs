//! Structured analysis frameworks
//!
//! Each framework is a pure function over the workflow (or intent) and
//! returns its own result type.

pub mod impact_effort;
pub mod mece;
pub mod option_framing;
pub mod selector;
pub mod value_driver;
pub mod zero_based;

// Re-exports
pub use impact_effort::{apply_impact_effort_matrix, ImpactEffortMatrix};
pub use mece::{apply_mece, MeceAnalysis, MeceCategory};
pub use option_framing::{generate_option_framing, DesignOption, OptionFraming};
pub use selector::{select_techniques, Technique, TechniqueScore};
pub use value_driver::{apply_value_driver_tree, ValueDriver, ValueDriverAnalysis};
pub use zero_based::{apply_zero_based_design, ZeroBasedDesign};
