//! Task results and the run report
//!
//! A `TaskResult` records the lifecycle of one task within a run; the
//! `RunReport` aggregates every result plus the judge's synthesized verdict
//! and is the externally visible artifact of a run. Failed sections are
//! carried explicitly so callers can tell "no data" from "not analyzed".

use crate::RunConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet dispatched
    Pending,
    /// Dispatched, awaiting completion
    Running,
    /// Finished with an output
    Succeeded,
    /// Finished with an error (retries exhausted or permanent failure)
    Failed,
    /// Never dispatched because a required prerequisite did not succeed
    Skipped,
    /// Aborted by run cancellation or a run-level deadline
    Cancelled,
}

impl TaskStatus {
    /// Whether the task can no longer change state
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }
}

/// Outcome of one task within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task id
    pub task: String,
    /// Id of the agent that ran (or would have run) the task
    pub agent: String,
    /// Final status
    pub status: TaskStatus,
    /// Output payload when the task succeeded
    pub output: Option<serde_json::Value>,
    /// Error detail when the task failed, was skipped, or cancelled
    pub error: Option<String>,
    /// Number of executor attempts made (0 if never dispatched)
    pub attempts: u32,
    /// When the first attempt started
    pub started_at: Option<DateTime<Utc>>,
    /// When the task reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskResult {
    /// Result for a task that was never dispatched
    pub fn skipped(task: impl Into<String>, agent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            agent: agent.into(),
            status: TaskStatus::Skipped,
            output: None,
            error: Some(reason.into()),
            attempts: 0,
            started_at: None,
            finished_at: Some(Utc::now()),
        }
    }

    /// Result for a task aborted by cancellation
    pub fn cancelled(task: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            agent: agent.into(),
            status: TaskStatus::Cancelled,
            output: None,
            error: Some("run cancelled before completion".to_string()),
            attempts: 0,
            started_at: None,
            finished_at: Some(Utc::now()),
        }
    }
}

/// Terminal state of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every required task succeeded
    Completed,
    /// A required task failed or was skipped
    Failed,
    /// The run deadline fired or the run was aborted
    Cancelled,
}

/// Parsed judge verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Investment rating (STRONG BUY .. STRONG SELL) when parseable
    pub rating: Option<String>,
    /// Confidence level (High/Medium/Low) when parseable
    pub confidence: Option<String>,
    /// Justification text when parseable
    pub justification: Option<String>,
    /// Raw judge output, always preserved
    pub raw: String,
}

/// Aggregate artifact of one workflow invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id for this run
    pub run_id: Uuid,
    /// Ticker or query the run analyzed
    pub query: String,
    /// Terminal run state
    pub status: RunStatus,
    /// Every task's result, in declaration order
    pub results: Vec<TaskResult>,
    /// The judge's synthesized verdict, when the judge task produced output
    pub verdict: Option<Verdict>,
    /// Wall-clock duration of the run in seconds
    pub elapsed_seconds: f64,
    /// Echo of the effective configuration
    pub config: RunConfig,
}

impl RunReport {
    /// Look up a task's result by id
    pub fn result(&self, task_id: &str) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.task == task_id)
    }

    /// Whether the run completed with every required task succeeded
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Ids of tasks that reached a given status
    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.task.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Skipped.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_skipped_result_carries_reason() {
        let result = TaskResult::skipped("judge", "judge-agent", "prerequisite 'news_analysis' failed");
        assert_eq!(result.status, TaskStatus::Skipped);
        assert_eq!(result.attempts, 0);
        assert!(result.error.as_deref().unwrap().contains("news_analysis"));
    }

    #[test]
    fn test_report_lookup() {
        let report = RunReport {
            run_id: Uuid::new_v4(),
            query: "AAPL".to_string(),
            status: RunStatus::Failed,
            results: vec![
                TaskResult::skipped("judge", "judge-agent", "skipped"),
                TaskResult::cancelled("news_analysis", "news"),
            ],
            verdict: None,
            elapsed_seconds: 1.5,
            config: RunConfig::default(),
        };

        assert!(report.result("judge").is_some());
        assert!(report.result("missing").is_none());
        assert_eq!(report.tasks_with_status(TaskStatus::Cancelled), vec!["news_analysis"]);
        assert!(!report.is_success());
    }
}
