//! Weighted aggregation of check results

use crate::checks;
use crate::rubric::{Expectations, Rubric};
use oracle_core::RunReport;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One line of the per-check breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckScore {
    /// Check name
    pub name: String,
    /// Rubric weight
    pub weight: f64,
    /// Raw check score in `0.0..=1.0`
    pub raw: f64,
    /// Weight-normalized contribution to the total
    pub weighted: f64,
}

/// Aggregate score with the full breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Weighted aggregate in `0.0..=1.0`
    pub total: f64,
    /// Every check's contribution, in rubric order
    pub breakdown: Vec<CheckScore>,
}

/// Score one report against a rubric
///
/// The total is the weight-normalized sum of raw check scores, so rubric
/// weights need not sum to one.
pub fn score(report: &RunReport, expected: &Expectations, rubric: &Rubric) -> ScoreResult {
    let total_weight = rubric.total_weight();
    let mut breakdown = Vec::with_capacity(rubric.checks.len());
    let mut total = 0.0;

    for check in &rubric.checks {
        let raw = checks::run(check.kind, report, expected);
        let weighted = if total_weight > 0.0 {
            raw * check.weight / total_weight
        } else {
            0.0
        };
        debug!(check = check.kind.name(), raw, weighted, "check scored");
        total += weighted;
        breakdown.push(CheckScore {
            name: check.kind.name().to_string(),
            weight: check.weight,
            raw,
            weighted,
        });
    }

    ScoreResult {
        total: total.clamp(0.0, 1.0),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{CheckKind, WeightedCheck};
    use oracle_core::{RunConfig, RunStatus, TaskResult, TaskStatus, Verdict};
    use uuid::Uuid;

    fn sample_report() -> RunReport {
        RunReport {
            run_id: Uuid::nil(),
            query: "AAPL".to_string(),
            status: RunStatus::Completed,
            results: vec![TaskResult {
                task: "investment_judge".to_string(),
                agent: "judge".to_string(),
                status: TaskStatus::Succeeded,
                output: Some(serde_json::json!(
                    r#"{"rating": "BUY", "confidence": "High", "justification": "Margins are expanding and the balance sheet is clean."}"#
                )),
                error: None,
                attempts: 1,
                started_at: None,
                finished_at: None,
            }],
            verdict: Some(Verdict {
                rating: Some("BUY".to_string()),
                confidence: Some("High".to_string()),
                justification: Some("Margins are expanding.".to_string()),
                raw: r#"{"rating": "BUY", "confidence": "High", "justification": "Margins are expanding and the balance sheet is clean."}"#.to_string(),
            }),
            elapsed_seconds: 2.0,
            config: RunConfig::default(),
        }
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let result = score(&sample_report(), &Expectations::default(), &Rubric::default());
        let sum: f64 = result.breakdown.iter().map(|c| c.weighted).sum();
        assert!((result.total - sum).abs() < 1e-9);
        assert_eq!(result.breakdown.len(), 5);
    }

    #[test]
    fn test_weights_normalized() {
        // Doubling every weight must not change the total
        let rubric = Rubric::default();
        let doubled = Rubric {
            checks: rubric
                .checks
                .iter()
                .map(|c| WeightedCheck { kind: c.kind, weight: c.weight * 2.0 })
                .collect(),
        };
        let report = sample_report();
        let expected = Expectations::default();
        let a = score(&report, &expected, &rubric);
        let b = score(&report, &expected, &doubled);
        assert!((a.total - b.total).abs() < 1e-9);
    }

    #[test]
    fn test_single_check_rubric() {
        let rubric = Rubric {
            checks: vec![WeightedCheck { kind: CheckKind::VerdictValidity, weight: 3.0 }],
        };
        let result = score(&sample_report(), &Expectations::default(), &rubric);
        assert!((result.total - 1.0).abs() < 1e-9);
        assert_eq!(result.breakdown[0].name, "verdict_validity");
        assert!((result.breakdown[0].raw - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_scoring() {
        let report = sample_report();
        let expected = Expectations {
            key_facts: vec!["margins".to_string()],
            fields: vec!["rating".to_string(), "confidence".to_string()],
            ..Default::default()
        };
        let rubric = Rubric::default();
        let first = score(&report, &expected, &rubric);
        for _ in 0..3 {
            let again = score(&report, &expected, &rubric);
            assert!((again.total - first.total).abs() < 1e-12);
        }
    }
}
