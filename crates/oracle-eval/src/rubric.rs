//! Rubrics: named checks with weights, plus per-case expectations

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};

/// The built-in check functions a rubric can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Required analysis sections present and succeeded
    SectionCoverage,
    /// Final output parses to a JSON object carrying the expected fields
    Structure,
    /// Expected key facts appear somewhere in the produced analysis
    FactualGrounding,
    /// Non-degenerate prose heuristics over the final output
    Coherence,
    /// Rating and confidence drawn from the allowed sets
    VerdictValidity,
}

impl CheckKind {
    /// Stable display name used in breakdowns
    pub fn name(self) -> &'static str {
        match self {
            CheckKind::SectionCoverage => "section_coverage",
            CheckKind::Structure => "structure",
            CheckKind::FactualGrounding => "factual_grounding",
            CheckKind::Coherence => "coherence",
            CheckKind::VerdictValidity => "verdict_validity",
        }
    }
}

/// One rubric entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedCheck {
    /// Which built-in check to run
    pub kind: CheckKind,
    /// Relative weight; the aggregate normalizes over the sum
    pub weight: f64,
}

/// A weighted set of checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rubric {
    /// Checks to run, in breakdown order
    pub checks: Vec<WeightedCheck>,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            checks: vec![
                WeightedCheck { kind: CheckKind::SectionCoverage, weight: 0.25 },
                WeightedCheck { kind: CheckKind::Structure, weight: 0.20 },
                WeightedCheck { kind: CheckKind::FactualGrounding, weight: 0.25 },
                WeightedCheck { kind: CheckKind::Coherence, weight: 0.15 },
                WeightedCheck { kind: CheckKind::VerdictValidity, weight: 0.15 },
            ],
        }
    }
}

impl Rubric {
    /// Load a rubric from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let rubric: Rubric = serde_json::from_str(&raw).map_err(|e| EvalError::InvalidFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        rubric.validate()?;
        Ok(rubric)
    }

    /// Validate weights and non-emptiness
    pub fn validate(&self) -> Result<()> {
        if self.checks.is_empty() {
            return Err(EvalError::InvalidRubric("rubric has no checks".to_string()));
        }
        for check in &self.checks {
            if !check.weight.is_finite() || check.weight <= 0.0 {
                return Err(EvalError::InvalidRubric(format!(
                    "check '{}' has non-positive weight {}",
                    check.kind.name(),
                    check.weight
                )));
            }
        }
        Ok(())
    }

    /// Sum of all check weights
    pub fn total_weight(&self) -> f64 {
        self.checks.iter().map(|c| c.weight).sum()
    }
}

/// Per-case expectations the checks score against
///
/// Every field is optional; an absent expectation makes the corresponding
/// part of a check vacuously satisfied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectations {
    /// Task ids that must have succeeded (defaults to every task in the report)
    #[serde(default)]
    pub required_tasks: Vec<String>,
    /// Fields the final JSON output must carry
    #[serde(default)]
    pub fields: Vec<String>,
    /// Facts that must appear verbatim (case-insensitive) in the analysis
    #[serde(default)]
    pub key_facts: Vec<String>,
}
