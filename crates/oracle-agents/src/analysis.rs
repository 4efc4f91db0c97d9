//! The company-analysis entry point
//!
//! Fetches reference data, seeds the execution context, runs the analyst
//! workflow, and attaches the parsed verdict to the report. Data sources
//! that cannot be fetched are simply absent from the context; tasks that
//! declared them fail at assembly rather than analyzing silently
//! substituted defaults.

use oracle_core::{params, ExecutionContext, Result, RunConfig, RunReport, TaskStatus};
use oracle_data::{DataError, FmpClient};
use oracle_llm::CompletionProvider;
use oracle_workflow::Orchestrator;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{self, sources, tasks};
use crate::extract::parse_verdict;

/// Run the full analyst workflow for one ticker
pub async fn run_company_analysis(
    ticker: &str,
    config: RunConfig,
    provider: Arc<dyn CompletionProvider>,
    data: &FmpClient,
) -> Result<RunReport> {
    config.validate()?;
    info!(%ticker, depth = %config.depth, style = %config.style, "starting company analysis");

    let workflow = catalog::build_workflow(config.depth, config.style)?;
    let ctx = build_context(ticker, &config, data).await;

    let orchestrator = Orchestrator::new(workflow, provider, config)?;
    let mut report = orchestrator.run(ctx).await;
    attach_verdict(&mut report);
    Ok(report)
}

/// Seed the context with run parameters and fetched reference data
async fn build_context(ticker: &str, config: &RunConfig, data: &FmpClient) -> ExecutionContext {
    let mut ctx = ExecutionContext::for_query(ticker.trim().to_uppercase());
    ctx.set_param(params::DEPTH, serde_json::json!(config.depth.to_string()));
    ctx.set_param(params::STYLE, serde_json::json!(config.style.to_string()));

    let (profile, quote, financials, news) = tokio::join!(
        data.company_profile(ticker),
        data.stock_quote(ticker),
        data.key_financials(ticker),
        data.stock_news(ticker),
    );

    attach_source(&mut ctx, sources::PROFILE, profile);
    attach_source(&mut ctx, sources::QUOTE, quote);
    attach_source(&mut ctx, sources::FINANCIALS, financials);
    attach_source(&mut ctx, sources::NEWS, news);
    ctx
}

/// Record one fetched source, or leave it absent on failure
fn attach_source<T: serde::Serialize>(
    ctx: &mut ExecutionContext,
    source: &str,
    fetched: std::result::Result<T, DataError>,
) {
    match fetched.and_then(|record| serde_json::to_value(record).map_err(DataError::from)) {
        Ok(value) => ctx.insert_reference(source, value),
        Err(DataError::NotFound { symbol, resource }) => {
            info!(%symbol, %resource, "no data for source '{source}', leaving it absent");
        }
        Err(e) => {
            warn!(%source, error = %e, "reference fetch failed, leaving source absent");
        }
    }
}

/// Parse the judge output into the report's structured verdict
fn attach_verdict(report: &mut RunReport) {
    let Some(result) = report.result(tasks::JUDGE) else {
        return;
    };
    if result.status != TaskStatus::Succeeded {
        return;
    }
    let raw = match &result.output {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => return,
    };
    report.verdict = Some(parse_verdict(&raw));
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::{RunStatus, TaskResult};
    use uuid::Uuid;

    fn report_with_judge(status: TaskStatus, output: Option<serde_json::Value>) -> RunReport {
        RunReport {
            run_id: Uuid::new_v4(),
            query: "AAPL".to_string(),
            status: RunStatus::Completed,
            results: vec![TaskResult {
                task: tasks::JUDGE.to_string(),
                agent: "judge".to_string(),
                status,
                output,
                error: None,
                attempts: 1,
                started_at: None,
                finished_at: None,
            }],
            verdict: None,
            elapsed_seconds: 0.1,
            config: RunConfig::default(),
        }
    }

    #[test]
    fn test_verdict_attached_from_judge_output() {
        let mut report = report_with_judge(
            TaskStatus::Succeeded,
            Some(serde_json::json!(
                r#"{"rating": "BUY", "confidence": "Medium", "justification": "Growth outweighs risk."}"#
            )),
        );
        attach_verdict(&mut report);
        let verdict = report.verdict.unwrap();
        assert_eq!(verdict.rating.as_deref(), Some("BUY"));
        assert_eq!(verdict.confidence.as_deref(), Some("Medium"));
    }

    #[test]
    fn test_no_verdict_when_judge_failed() {
        let mut report = report_with_judge(TaskStatus::Skipped, None);
        attach_verdict(&mut report);
        assert!(report.verdict.is_none());
    }

    #[test]
    fn test_unparseable_judge_output_still_attached() {
        let mut report = report_with_judge(
            TaskStatus::Succeeded,
            Some(serde_json::json!("Strongly positive about this one.")),
        );
        attach_verdict(&mut report);
        let verdict = report.verdict.unwrap();
        assert_eq!(verdict.rating, None);
        assert_eq!(verdict.raw, "Strongly positive about this one.");
    }
}
