//! Corpus-mode evaluation over saved case files
//!
//! A corpus is a directory of JSON files, each holding one saved report
//! plus the expectations to score it against. Cases are evaluated in
//! filename order so summaries are stable across runs.

use crate::error::{EvalError, Result};
use crate::rubric::{Expectations, Rubric};
use crate::score::{score, ScoreResult};
use oracle_core::RunReport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One saved evaluation case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    /// Case name; defaults to the file stem when omitted
    #[serde(default)]
    pub name: Option<String>,
    /// The saved run report to score
    pub report: RunReport,
    /// Expectations for this case
    #[serde(default)]
    pub expected: Expectations,
}

/// One scored case in a corpus summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseScore {
    /// Case name
    pub name: String,
    /// The case's score and breakdown
    pub score: ScoreResult,
}

/// Aggregate over a whole corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSummary {
    /// Per-case scores, in filename order
    pub cases: Vec<CaseScore>,
    /// Mean of the case totals
    pub mean: f64,
}

/// Score every case file in a corpus directory
pub fn evaluate(corpus_dir: &Path, rubric: &Rubric) -> Result<CorpusSummary> {
    rubric.validate()?;

    let mut paths: Vec<_> = std::fs::read_dir(corpus_dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(EvalError::EmptyCorpus(corpus_dir.display().to_string()));
    }

    let mut cases = Vec::with_capacity(paths.len());
    for path in &paths {
        let case = load_case(path)?;
        let name = case.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let result = score(&case.report, &case.expected, rubric);
        info!(case = %name, total = result.total, "case scored");
        cases.push(CaseScore { name, score: result });
    }

    let mean = cases.iter().map(|c| c.score.total).sum::<f64>() / cases.len() as f64;
    Ok(CorpusSummary { cases, mean })
}

fn load_case(path: &Path) -> Result<EvalCase> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| EvalError::InvalidFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
