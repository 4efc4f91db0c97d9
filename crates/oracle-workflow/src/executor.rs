//! Task execution with bounded retries
//!
//! The executor invokes one agent against one assembled input through the
//! completion-provider boundary. Transient failures are retried with
//! exponential backoff up to a configured bound; permanent failures and
//! exhausted retries come back as a `Failed` task result. Errors never
//! propagate past this boundary, and the executor holds no per-call state,
//! so one instance is safe to share across concurrent tasks.

use crate::assembler::AssembledInput;
use chrono::Utc;
use oracle_core::{AgentSpec, Error, RunConfig, TaskResult, TaskStatus};
use oracle_llm::{CompletionProvider, CompletionRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Retry policy with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts (first try plus retries)
    pub max_attempts: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Cap on any single backoff
    pub max_backoff: Duration,
    /// Backoff multiplier between attempts
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy allowing `retry_limit` retries after the first attempt
    pub fn with_retry_limit(retry_limit: u32) -> Self {
        Self {
            max_attempts: retry_limit + 1,
            ..Default::default()
        }
    }

    /// Policy with near-zero backoff (for tests)
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(50),
            backoff_multiplier: 2.0,
        }
    }

    /// Backoff before the given retry attempt (attempt 1 = first retry)
    fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        backoff.min(self.max_backoff)
    }
}

/// Configuration for the task executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Model passed to the completion provider
    pub model: String,
    /// Bounded wait on each provider call
    pub task_timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
    /// Max completion tokens per call
    pub max_tokens: Option<usize>,
}

impl ExecutorConfig {
    /// Derive executor settings from a run configuration
    pub fn from_run_config(config: &RunConfig) -> Self {
        Self {
            model: config.model.clone(),
            task_timeout: config.task_timeout(),
            retry: RetryPolicy::with_retry_limit(config.retry_limit),
            max_tokens: None,
        }
    }
}

/// Stateless executor for single tasks
pub struct TaskExecutor {
    provider: Arc<dyn CompletionProvider>,
    config: ExecutorConfig,
}

impl TaskExecutor {
    /// Create a new executor
    pub fn new(provider: Arc<dyn CompletionProvider>, config: ExecutorConfig) -> Self {
        Self { provider, config }
    }

    /// Execute one task; always returns a terminal [`TaskResult`]
    pub async fn execute(&self, agent: &AgentSpec, input: AssembledInput) -> TaskResult {
        let started_at = Utc::now();
        let mut attempts = 0;

        let outcome = loop {
            attempts += 1;
            debug!(
                task = %input.task,
                agent = %agent.id,
                attempt = attempts,
                max = self.config.retry.max_attempts,
                "invoking agent"
            );

            let mut request = CompletionRequest::builder(&self.config.model)
                .system(&input.system)
                .prompt(&input.prompt);
            if let Some(temperature) = input.temperature {
                request = request.temperature(temperature);
            }
            if let Some(max_tokens) = self.config.max_tokens {
                request = request.max_tokens(max_tokens);
            }

            match timeout(self.config.task_timeout, self.provider.complete(request.build())).await {
                Ok(Ok(response)) => break Ok(response),
                Ok(Err(e)) if e.is_transient() => {
                    if attempts < self.config.retry.max_attempts {
                        let backoff = self.config.retry.backoff_duration(attempts);
                        warn!(
                            task = %input.task,
                            attempt = attempts,
                            error = %e,
                            ?backoff,
                            "transient failure, retrying"
                        );
                        sleep(backoff).await;
                        continue;
                    }
                    break Err(Error::Permanent(format!(
                        "retries exhausted after {attempts} attempts: {e}"
                    )));
                }
                Ok(Err(e)) => break Err(Error::Permanent(e.to_string())),
                // A timed-out attempt is treated as cancellation, not retried
                Err(_) => {
                    break Err(Error::Timeout(self.config.task_timeout.as_secs_f64()));
                }
            }
        };

        let finished_at = Utc::now();
        match outcome {
            Ok(response) => TaskResult {
                task: input.task,
                agent: agent.id.clone(),
                status: TaskStatus::Succeeded,
                output: Some(serde_json::Value::String(response.text)),
                error: None,
                attempts,
                started_at: Some(started_at),
                finished_at: Some(finished_at),
            },
            Err(e) => {
                warn!(task = %input.task, error = %e, "task failed");
                TaskResult {
                    task: input.task,
                    agent: agent.id.clone(),
                    status: TaskStatus::Failed,
                    output: None,
                    error: Some(e.to_string()),
                    attempts,
                    started_at: Some(started_at),
                    finished_at: Some(finished_at),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oracle_llm::{CompletionResponse, LLMError};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedProvider {
        calls: AtomicU32,
        /// Number of leading calls that fail transiently
        transient_failures: u32,
        /// When true every call fails permanently
        always_permanent: bool,
        delay: Option<Duration>,
    }

    impl ScriptedProvider {
        fn succeeding() -> Self {
            Self {
                calls: AtomicU32::new(0),
                transient_failures: 0,
                always_permanent: false,
                delay: None,
            }
        }

        fn flaky(transient_failures: u32) -> Self {
            Self {
                transient_failures,
                ..Self::succeeding()
            }
        }

        fn permanent() -> Self {
            Self {
                always_permanent: true,
                ..Self::succeeding()
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::succeeding()
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> oracle_llm::Result<CompletionResponse> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                sleep(delay).await;
            }
            if self.always_permanent {
                return Err(LLMError::AuthenticationFailed);
            }
            if call < self.transient_failures {
                return Err(LLMError::RequestFailed("503".to_string()));
            }
            Ok(CompletionResponse {
                text: "OK".to_string(),
                model: request.model,
                usage: None,
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn agent() -> AgentSpec {
        AgentSpec::builder("financial")
            .role("Financial Analyst")
            .goal("Analyze")
            .backstory("Veteran analyst.")
            .build()
    }

    fn input() -> AssembledInput {
        AssembledInput {
            task: "financial_analysis".to_string(),
            system: "system".to_string(),
            prompt: "prompt".to_string(),
            temperature: None,
        }
    }

    fn executor(provider: Arc<ScriptedProvider>, retry: RetryPolicy) -> TaskExecutor {
        TaskExecutor::new(
            provider,
            ExecutorConfig {
                model: "test-model".to_string(),
                task_timeout: Duration::from_secs(5),
                retry,
                max_tokens: None,
            },
        )
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let provider = Arc::new(ScriptedProvider::succeeding());
        let exec = executor(Arc::clone(&provider), RetryPolicy::fast());

        let result = exec.execute(&agent(), input()).await;
        assert_eq!(result.status, TaskStatus::Succeeded);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.output, Some(serde_json::json!("OK")));
        assert!(result.started_at.is_some() && result.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let provider = Arc::new(ScriptedProvider::flaky(1));
        let exec = executor(Arc::clone(&provider), RetryPolicy::fast());

        let result = exec.execute(&agent(), input()).await;
        assert_eq!(result.status, TaskStatus::Succeeded);
        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_retry_limit_two_means_three_attempts() {
        // retry_limit=2 and an always-transient provider: exactly 3
        // invocations, then a failed result with permanent detail
        let provider = Arc::new(ScriptedProvider::flaky(u32::MAX));
        let mut retry = RetryPolicy::with_retry_limit(2);
        retry.initial_backoff = Duration::from_millis(1);
        let exec = executor(Arc::clone(&provider), retry);

        let result = exec.execute(&agent(), input()).await;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.attempts, 3);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert!(result.error.as_deref().unwrap().contains("retries exhausted"));
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let provider = Arc::new(ScriptedProvider::permanent());
        let exec = executor(Arc::clone(&provider), RetryPolicy::fast());

        let result = exec.execute(&agent(), input()).await;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.attempts, 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_task_timeout_not_retried() {
        let provider = Arc::new(ScriptedProvider::slow(Duration::from_secs(30)));
        let exec = TaskExecutor::new(
            Arc::clone(&provider) as _,
            ExecutorConfig {
                model: "test-model".to_string(),
                task_timeout: Duration::from_millis(20),
                retry: RetryPolicy::fast(),
                max_tokens: None,
            },
        );

        let result = exec.execute(&agent(), input()).await;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.attempts, 1);
        assert!(result.error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn test_backoff_progression() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            backoff_multiplier: 2.0,
        };

        assert_eq!(policy.backoff_duration(0), Duration::ZERO);
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(200));
        // Capped at max_backoff
        assert_eq!(policy.backoff_duration(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_duration(10), Duration::from_millis(350));
    }
}
