//! Technique selection
//!
//! Scores which analysis frameworks apply to an intent. Techniques are a closed
//! enum; the engine maps each one to its strategy function.

use crate::types::{Level, OptionalParams, ParsedIntent};
use serde::{Deserialize, Serialize};

/// Structured analysis framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technique {
    #[serde(rename = "MECE")]
    Mece,
    ValueDriverTree,
    ZeroBased,
    ImpactEffort,
    OptionFraming,
}

impl Technique {
    pub const ALL: [Technique; 5] = [
        Technique::Mece,
        Technique::ValueDriverTree,
        Technique::ZeroBased,
        Technique::ImpactEffort,
        Technique::OptionFraming,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Technique::Mece => "MECE",
            Technique::ValueDriverTree => "ValueDriverTree",
            Technique::ZeroBased => "ZeroBased",
            Technique::ImpactEffort => "ImpactEffort",
            Technique::OptionFraming => "OptionFraming",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Technique::Mece => "Partitions steps into mutually exclusive, collectively exhaustive categories",
            Technique::ValueDriverTree => "Ranks steps by quota cost and infers root causes",
            Technique::ZeroBased => "Challenges baseline assumptions and proposes a radical redesign",
            Technique::ImpactEffort => "Classifies optimisations into impact/effort quadrants",
            Technique::OptionFraming => "Frames conservative, balanced and bold recommendation bundles",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechniqueScore {
    pub technique: Technique,
    pub relevance_score: f64,
}

const COMPLEX_TECHNICAL_REQUIREMENTS: usize = 6;
const COMPLEX_REQUIRED_OPERATIONS: usize = 8;
const COMPLEX_SIGNIFICANT_RISKS: usize = 2;

/// Whether the intent carries enough scope or risk to warrant deeper analysis
pub fn is_complex(intent: &ParsedIntent) -> bool {
    let significant_risks = intent
        .potential_risks
        .iter()
        .filter(|risk| risk.severity >= Level::Medium)
        .count();

    intent.technical_requirements.len() >= COMPLEX_TECHNICAL_REQUIREMENTS
        || intent.required_operations.len() >= COMPLEX_REQUIRED_OPERATIONS
        || significant_risks >= COMPLEX_SIGNIFICANT_RISKS
}

/// Choose the applicable techniques, highest relevance first (stable on ties)
pub fn select_techniques(intent: &ParsedIntent, params: Option<&OptionalParams>) -> Vec<TechniqueScore> {
    let params = params.copied().unwrap_or_default();
    let complex = is_complex(intent);

    let mut scores = vec![
        TechniqueScore { technique: Technique::Mece, relevance_score: 0.9 },
        TechniqueScore { technique: Technique::OptionFraming, relevance_score: 0.8 },
    ];

    if complex {
        scores.push(TechniqueScore { technique: Technique::ValueDriverTree, relevance_score: 0.85 });
    }

    if complex || params.has_tight_budget() {
        let relevance: f64 = if params.has_tight_budget() { 0.9 } else { 0.7 };
        scores.push(TechniqueScore { technique: Technique::ZeroBased, relevance_score: relevance });
    }

    if complex || params.is_high_volume() {
        let relevance: f64 = if params.is_high_volume() { 0.85 } else { 0.65 };
        scores.push(TechniqueScore { technique: Technique::ImpactEffort, relevance_score: relevance });
    }

    scores.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CostConstraints, Operation, Risk};

    fn names(scores: &[TechniqueScore]) -> Vec<Technique> {
        scores.iter().map(|s| s.technique).collect()
    }

    fn score_of(scores: &[TechniqueScore], technique: Technique) -> f64 {
        scores
            .iter()
            .find(|s| s.technique == technique)
            .map(|s| s.relevance_score)
            .unwrap()
    }

    #[test]
    fn test_simple_intent_gets_baseline() {
        let scores = select_techniques(&ParsedIntent::default(), None);
        assert_eq!(names(&scores), vec![Technique::Mece, Technique::OptionFraming]);
    }

    #[test]
    fn test_complex_intent_adds_deeper_frameworks() {
        let intent = ParsedIntent {
            required_operations: (0..8)
                .map(|i| Operation {
                    name: format!("op{}", i),
                    operation_type: "processing".to_string(),
                    description: String::new(),
                })
                .collect(),
            ..Default::default()
        };

        let scores = select_techniques(&intent, None);
        assert!(names(&scores).contains(&Technique::ValueDriverTree));
        assert!(names(&scores).contains(&Technique::ZeroBased));

        for pair in scores.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
    }

    #[test]
    fn test_risks_make_intent_complex() {
        let risk = Risk {
            category: "cost".to_string(),
            description: "overspend".to_string(),
            severity: Level::High,
            likelihood: Level::Low,
        };
        let intent = ParsedIntent {
            potential_risks: vec![risk.clone(), risk],
            ..Default::default()
        };
        assert!(is_complex(&intent));
    }

    #[test]
    fn test_params_raise_relevance() {
        let tight = OptionalParams {
            cost_constraints: Some(CostConstraints {
                max_vibes: Some(10.0),
                max_cost_dollars: None,
            }),
            expected_user_volume: Some(10_000),
            ..Default::default()
        };
        let complex = ParsedIntent {
            technical_requirements: (0..6).map(|i| format!("req{}", i)).collect(),
            ..Default::default()
        };

        let base = select_techniques(&complex, None);
        let tuned = select_techniques(&complex, Some(&tight));

        assert!(score_of(&tuned, Technique::ZeroBased) > score_of(&base, Technique::ZeroBased));
        assert!(score_of(&tuned, Technique::ImpactEffort) > score_of(&base, Technique::ImpactEffort));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let tight = OptionalParams {
            cost_constraints: Some(CostConstraints {
                max_vibes: Some(50.0),
                max_cost_dollars: None,
            }),
            ..Default::default()
        };

        let scores = select_techniques(&ParsedIntent::default(), Some(&tight));
        assert_eq!(score_of(&scores, Technique::ZeroBased), score_of(&scores, Technique::Mece));
        assert_eq!(
            names(&scores),
            vec![Technique::Mece, Technique::ZeroBased, Technique::OptionFraming]
        );
    }
}
