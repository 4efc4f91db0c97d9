//! The built-in check functions
//!
//! Each check is a pure `0.0..=1.0` function over a report and the case's
//! expectations. No randomness, no IO, no clocks; identical inputs always
//! give identical scores.

use crate::rubric::{CheckKind, Expectations};
use oracle_agents::extract_json_like;
use oracle_core::{RunReport, TaskStatus};

const RATINGS: [&str; 5] = ["STRONG BUY", "BUY", "HOLD", "SELL", "STRONG SELL"];
const CONFIDENCES: [&str; 3] = ["High", "Medium", "Low"];

/// Run one check against a report
pub fn run(kind: CheckKind, report: &RunReport, expected: &Expectations) -> f64 {
    let raw = match kind {
        CheckKind::SectionCoverage => section_coverage(report, expected),
        CheckKind::Structure => structure(report, expected),
        CheckKind::FactualGrounding => factual_grounding(report, expected),
        CheckKind::Coherence => coherence(report),
        CheckKind::VerdictValidity => verdict_validity(report),
    };
    raw.clamp(0.0, 1.0)
}

/// Fraction of required tasks that succeeded
fn section_coverage(report: &RunReport, expected: &Expectations) -> f64 {
    let required: Vec<&str> = if expected.required_tasks.is_empty() {
        report.results.iter().map(|r| r.task.as_str()).collect()
    } else {
        expected.required_tasks.iter().map(String::as_str).collect()
    };
    if required.is_empty() {
        return 0.0;
    }
    let succeeded = required
        .iter()
        .filter(|id| {
            report
                .result(id)
                .is_some_and(|r| r.status == TaskStatus::Succeeded)
        })
        .count();
    succeeded as f64 / required.len() as f64
}

/// The final output parses to a JSON object with the expected fields
fn structure(report: &RunReport, expected: &Expectations) -> f64 {
    let Some(text) = final_output(report) else {
        return 0.0;
    };
    let Some(parsed) = extract_json_like(&text) else {
        return 0.0;
    };
    if expected.fields.is_empty() {
        return 1.0;
    }
    let present = expected
        .fields
        .iter()
        .filter(|field| parsed.get(field.as_str()).is_some())
        .count();
    present as f64 / expected.fields.len() as f64
}

/// Fraction of expected key facts found in the produced analysis
fn factual_grounding(report: &RunReport, expected: &Expectations) -> f64 {
    if expected.key_facts.is_empty() {
        return 1.0;
    }
    let haystack = all_text(report).to_lowercase();
    let found = expected
        .key_facts
        .iter()
        .filter(|fact| haystack.contains(&fact.to_lowercase()))
        .count();
    found as f64 / expected.key_facts.len() as f64
}

/// Non-degenerate prose heuristics over the final output
///
/// Averages three signals: enough words, lexical diversity, and sentence
/// punctuation. Catches empty, truncated, and looping outputs.
fn coherence(report: &RunReport) -> f64 {
    let Some(text) = final_output(report) else {
        return 0.0;
    };
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let length_score = (words.len() as f64 / 20.0).min(1.0);

    let unique: std::collections::HashSet<String> =
        words.iter().map(|w| w.to_lowercase()).collect();
    let diversity = unique.len() as f64 / words.len() as f64;
    let diversity_score = (diversity / 0.4).min(1.0);

    let punctuation_score = if text.contains('.') || text.contains('}') {
        1.0
    } else {
        0.0
    };

    (length_score + diversity_score + punctuation_score) / 3.0
}

/// Rating and confidence drawn from the allowed sets
fn verdict_validity(report: &RunReport) -> f64 {
    let Some(verdict) = &report.verdict else {
        return 0.0;
    };
    let rating_ok = verdict
        .rating
        .as_deref()
        .is_some_and(|r| RATINGS.contains(&r));
    let confidence_ok = verdict
        .confidence
        .as_deref()
        .is_some_and(|c| CONFIDENCES.contains(&c));
    f64::from(u8::from(rating_ok)) * 0.5 + f64::from(u8::from(confidence_ok)) * 0.5
}

/// The text scored by output-shaped checks: the verdict when present,
/// otherwise the last succeeded task output
fn final_output(report: &RunReport) -> Option<String> {
    if let Some(verdict) = &report.verdict {
        return Some(verdict.raw.clone());
    }
    report
        .results
        .iter()
        .rev()
        .filter(|r| r.status == TaskStatus::Succeeded)
        .find_map(|r| r.output.as_ref().map(value_text))
}

/// Every produced output concatenated, for fact lookup
fn all_text(report: &RunReport) -> String {
    let mut text = String::new();
    for result in &report.results {
        if let Some(output) = &result.output {
            text.push_str(&value_text(output));
            text.push('\n');
        }
    }
    if let Some(verdict) = &report.verdict {
        text.push_str(&verdict.raw);
    }
    text
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::{RunConfig, RunStatus, TaskResult, Verdict};
    use uuid::Uuid;

    fn report(results: Vec<TaskResult>, verdict: Option<Verdict>) -> RunReport {
        RunReport {
            run_id: Uuid::nil(),
            query: "AAPL".to_string(),
            status: RunStatus::Completed,
            results,
            verdict,
            elapsed_seconds: 1.0,
            config: RunConfig::default(),
        }
    }

    fn succeeded(task: &str, output: &str) -> TaskResult {
        TaskResult {
            task: task.to_string(),
            agent: task.to_string(),
            status: TaskStatus::Succeeded,
            output: Some(serde_json::json!(output)),
            error: None,
            attempts: 1,
            started_at: None,
            finished_at: None,
        }
    }

    #[test]
    fn test_section_coverage_counts_required_tasks() {
        let r = report(
            vec![
                succeeded("financial_analysis", "ok"),
                TaskResult::skipped("investment_judge", "judge", "prereq failed"),
            ],
            None,
        );
        let half = Expectations::default();
        assert!((run(CheckKind::SectionCoverage, &r, &half) - 0.5).abs() < 1e-9);

        let only_financial = Expectations {
            required_tasks: vec!["financial_analysis".to_string()],
            ..Default::default()
        };
        assert!((run(CheckKind::SectionCoverage, &r, &only_financial) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_structure_scores_expected_fields() {
        let r = report(
            vec![succeeded(
                "investment_judge",
                r#"{"rating": "BUY", "confidence": "High"}"#,
            )],
            None,
        );
        let expected = Expectations {
            fields: vec![
                "rating".to_string(),
                "confidence".to_string(),
                "justification".to_string(),
            ],
            ..Default::default()
        };
        let score = run(CheckKind::Structure, &r, &expected);
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_structure_zero_for_prose() {
        let r = report(vec![succeeded("investment_judge", "just some prose")], None);
        assert!((run(CheckKind::Structure, &r, &Expectations::default()) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_factual_grounding_case_insensitive() {
        let r = report(
            vec![succeeded("profile_research", "Apple Inc. designs the iPhone")],
            None,
        );
        let expected = Expectations {
            key_facts: vec!["apple inc".to_string(), "android".to_string()],
            ..Default::default()
        };
        assert!((run(CheckKind::FactualGrounding, &r, &expected) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_coherence_flags_degenerate_output() {
        let looping = report(
            vec![succeeded("investment_judge", "buy buy buy buy buy buy buy buy")],
            None,
        );
        let prose = report(
            vec![succeeded(
                "investment_judge",
                "The company shows strong revenue growth with healthy margins. \
                 Debt levels are manageable and cash flow generation is robust.",
            )],
            None,
        );
        let exp = Expectations::default();
        assert!(run(CheckKind::Coherence, &looping, &exp) < run(CheckKind::Coherence, &prose, &exp));
        assert!(run(CheckKind::Coherence, &prose, &exp) > 0.9);
    }

    #[test]
    fn test_verdict_validity_requires_allowed_values() {
        let valid = report(
            vec![],
            Some(Verdict {
                rating: Some("BUY".to_string()),
                confidence: Some("High".to_string()),
                justification: None,
                raw: String::new(),
            }),
        );
        let off_scale = report(
            vec![],
            Some(Verdict {
                rating: Some("MEGA BUY".to_string()),
                confidence: Some("High".to_string()),
                justification: None,
                raw: String::new(),
            }),
        );
        let exp = Expectations::default();
        assert!((run(CheckKind::VerdictValidity, &valid, &exp) - 1.0).abs() < 1e-9);
        assert!((run(CheckKind::VerdictValidity, &off_scale, &exp) - 0.5).abs() < 1e-9);
        assert!((run(CheckKind::VerdictValidity, &report(vec![], None), &exp) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_checks_are_deterministic() {
        let r = report(
            vec![succeeded("investment_judge", r#"{"rating": "HOLD"}"#)],
            None,
        );
        let exp = Expectations {
            key_facts: vec!["HOLD".to_string()],
            fields: vec!["rating".to_string()],
            ..Default::default()
        };
        for kind in [
            CheckKind::SectionCoverage,
            CheckKind::Structure,
            CheckKind::FactualGrounding,
            CheckKind::Coherence,
            CheckKind::VerdictValidity,
        ] {
            let first = run(kind, &r, &exp);
            for _ in 0..5 {
                assert!((run(kind, &r, &exp) - first).abs() < 1e-12);
            }
        }
    }
}
