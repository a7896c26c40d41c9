//! Workflow model and the value types exchanged with upstream/downstream collaborators

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Kind of work a step performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Vibe,
    Spec,
    DataRetrieval,
    Processing,
    Analysis,
}

impl StepType {
    pub const ALL: [StepType; 5] = [
        StepType::Vibe,
        StepType::Spec,
        StepType::DataRetrieval,
        StepType::Processing,
        StepType::Analysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Vibe => "vibe",
            StepType::Spec => "spec",
            StepType::DataRetrieval => "data_retrieval",
            StepType::Processing => "processing",
            StepType::Analysis => "analysis",
        }
    }

    /// Display label, e.g. "Data Retrieval"
    pub fn label(&self) -> &'static str {
        match self {
            StepType::Vibe => "Vibe",
            StepType::Spec => "Spec",
            StepType::DataRetrieval => "Data Retrieval",
            StepType::Processing => "Processing",
            StepType::Analysis => "Analysis",
        }
    }
}

/// Shared low/medium/high ordinal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Numeric weight used when combining levels (low = 1, high = 3)
    pub fn weight(&self) -> u32 {
        match self {
            Level::Low => 1,
            Level::Medium => 2,
            Level::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }
}

/// A single step of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Unique step identifier
    pub id: String,

    #[serde(rename = "type")]
    pub step_type: StepType,

    #[serde(default)]
    pub description: String,

    /// Named inputs (kept sorted)
    #[serde(default)]
    pub inputs: BTreeSet<String>,

    /// Named outputs (kept sorted)
    #[serde(default)]
    pub outputs: BTreeSet<String>,

    /// Abstract quota units consumed by this step
    #[serde(default)]
    pub quota_cost: f64,
}

/// Data flowing from one step to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFlowEdge {
    pub from: String,
    pub to: String,

    #[serde(default)]
    pub data_type: String,

    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

/// Immutable workflow description produced by the intent parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,

    /// Ordered steps (ids unique)
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_flow: Vec<DataFlowEdge>,

    /// Informational only
    #[serde(default)]
    pub estimated_complexity: f64,
}

impl Workflow {
    pub fn new(id: impl Into<String>, steps: Vec<WorkflowStep>) -> Self {
        let mut workflow = Self {
            id: id.into(),
            steps,
            data_flow: vec![],
            estimated_complexity: 0.0,
        };
        workflow.estimated_complexity = workflow.compute_complexity();
        workflow
    }

    pub fn with_data_flow(mut self, data_flow: Vec<DataFlowEdge>) -> Self {
        self.data_flow = data_flow;
        self.estimated_complexity = self.compute_complexity();
        self
    }

    /// Get step by ID
    pub fn get_step(&self, step_id: &str) -> Option<&WorkflowStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    /// Map of step id -> position in the workflow
    pub fn positions(&self) -> HashMap<&str, usize> {
        self.steps
            .iter()
            .enumerate()
            .map(|(idx, step)| (step.id.as_str(), idx))
            .collect()
    }

    pub fn total_quota_cost(&self) -> f64 {
        self.steps.iter().map(|step| step.quota_cost).sum()
    }

    pub fn mean_step_cost(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.total_quota_cost() / self.steps.len() as f64
    }

    /// Count steps by type
    pub fn step_count_by_type(&self) -> BTreeMap<StepType, usize> {
        let mut counts = BTreeMap::new();
        for step in &self.steps {
            *counts.entry(step.step_type).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of the cost of the named steps; unknown ids contribute nothing
    pub fn cost_of(&self, step_ids: &[String]) -> f64 {
        step_ids
            .iter()
            .filter_map(|id| self.get_step(id))
            .map(|step| step.quota_cost)
            .sum()
    }

    /// Build a directed graph of the declared data flow.
    /// Edges whose endpoints are not steps of this workflow are ignored.
    pub fn data_flow_graph(&self) -> DiGraph<&str, &str> {
        let mut graph = DiGraph::new();
        let indices: HashMap<&str, NodeIndex> = self
            .steps
            .iter()
            .map(|step| (step.id.as_str(), graph.add_node(step.id.as_str())))
            .collect();

        for edge in &self.data_flow {
            if let (Some(&from), Some(&to)) =
                (indices.get(edge.from.as_str()), indices.get(edge.to.as_str()))
            {
                graph.add_edge(from, to, edge.data_type.as_str());
            }
        }

        graph
    }

    /// Whether the declared data flow contains a cycle
    pub fn has_cyclic_data_flow(&self) -> bool {
        is_cyclic_directed(&self.data_flow_graph())
    }

    /// steps + 0.5 per edge + 2 per vibe step
    pub fn compute_complexity(&self) -> f64 {
        let vibes = self
            .steps
            .iter()
            .filter(|step| step.step_type == StepType::Vibe)
            .count();
        self.steps.len() as f64 + 0.5 * self.data_flow.len() as f64 + 2.0 * vibes as f64
    }
}

/// Kind of inefficiency reported by an upstream detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    RedundantQuery,
    ExcessiveLoops,
    UnnecessaryVibes,
    #[serde(other)]
    Other,
}

/// Detected efficiency problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,

    pub severity: Level,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub suggested_fix: String,

    #[serde(default)]
    pub steps_affected: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationType {
    Caching,
    Batching,
    VibeToSpec,
    Decomposition,
}

impl OptimizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationType::Caching => "caching",
            OptimizationType::Batching => "batching",
            OptimizationType::VibeToSpec => "vibe_to_spec",
            OptimizationType::Decomposition => "decomposition",
        }
    }
}

/// Estimated quota saved by an optimisation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimatedSavings {
    pub vibes: f64,
    pub specs: f64,
    /// 0-100
    pub percentage: f64,
}

/// A typed optimisation opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
    #[serde(rename = "type")]
    pub optimization_type: OptimizationType,

    pub description: String,

    /// Always a subset of the workflow's step ids, in workflow order
    pub steps_affected: Vec<String>,

    pub estimated_savings: EstimatedSavings,

    /// Explicit effort mark; overrides the type-derived effort when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<Level>,
}

/// Steps collapsed into one batched call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedOperation {
    pub original_operations: Vec<String>,
    pub batch_size: usize,

    #[serde(rename = "type")]
    pub step_type: StepType,

    pub description: String,
    pub estimated_savings: f64,
}

/// A step selected for caching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePoint {
    pub step_id: String,
    pub cache_key: String,
    /// Seconds
    pub ttl: u64,
    /// 0.0-1.0
    pub estimated_hit_rate: f64,
}

/// A bounded, reviewable sub-unit of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    pub estimated_quota_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vibes: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost_dollars: Option<f64>,
}

/// Optional tuning inputs; read-only to the engine
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionalParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_user_volume: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_constraints: Option<CostConstraints>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_sensitivity: Option<Level>,
}

/// Operation the user asked for, as understood by the intent parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,

    #[serde(default)]
    pub operation_type: String,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,

    #[serde(default)]
    pub source_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: String,

    pub severity: Level,
    pub likelihood: Level,
}

/// Structured intent produced by the upstream parser
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedIntent {
    #[serde(default)]
    pub business_goal: String,

    #[serde(default)]
    pub required_operations: Vec<Operation>,

    #[serde(default)]
    pub data_sources: Vec<DataSource>,

    #[serde(default)]
    pub technical_requirements: Vec<String>,

    #[serde(default)]
    pub potential_risks: Vec<Risk>,
}

impl ParsedIntent {
    /// Derive an intent for callers that only supply a workflow.
    /// Each step becomes an operation, each data_retrieval step a data source,
    /// each issue a medium-likelihood risk.
    pub fn from_workflow(workflow: &Workflow, issues: &[EfficiencyIssue]) -> Self {
        Self {
            business_goal: format!("Optimise workflow '{}'", workflow.id),
            required_operations: workflow
                .steps
                .iter()
                .map(|step| Operation {
                    name: step.id.clone(),
                    operation_type: step.step_type.as_str().to_string(),
                    description: step.description.clone(),
                })
                .collect(),
            data_sources: workflow
                .steps
                .iter()
                .filter(|step| step.step_type == StepType::DataRetrieval)
                .map(|step| DataSource {
                    name: step.id.clone(),
                    source_type: "workflow_step".to_string(),
                })
                .collect(),
            technical_requirements: vec![],
            potential_risks: issues
                .iter()
                .map(|issue| Risk {
                    category: "efficiency".to_string(),
                    description: issue.description.clone(),
                    severity: issue.severity,
                    likelihood: Level::Medium,
                })
                .collect(),
        }
    }
}
