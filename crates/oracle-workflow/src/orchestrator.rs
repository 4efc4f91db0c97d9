//! Workflow definition and DAG orchestration
//!
//! A [`Workflow`] is a validated set of agent and task specs whose
//! dependencies form a DAG. The [`Orchestrator`] runs it: tasks whose
//! prerequisites have all succeeded are dispatched concurrently, results
//! are merged into the execution context as they arrive, and a
//! [`RunReport`] is always produced, partial or not.
//!
//! Scheduling guarantees:
//! - ready tasks are dispatched in declaration order (deterministic runs)
//! - each task id is dispatched at most once per run
//! - context writes happen on the orchestrator side of the join, one
//!   writer, write-once per task id
//! - a task whose required prerequisite did not succeed is skipped, never
//!   dispatched

use crate::assembler::ContextAssembler;
use crate::executor::{ExecutorConfig, TaskExecutor};
use oracle_core::{
    AgentSpec, Error, ExecutionContext, Result, RunConfig, RunReport, RunStatus, TaskResult,
    TaskSpec, TaskStatus,
};
use oracle_llm::CompletionProvider;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::timeout_at;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A validated workflow: agents plus a DAG of tasks
#[derive(Debug)]
pub struct Workflow {
    agents: HashMap<String, AgentSpec>,
    tasks: Vec<TaskSpec>,
    index: HashMap<String, usize>,
}

impl Workflow {
    /// Create a workflow builder
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::new()
    }

    /// Tasks in declaration order
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Look up an agent spec by id
    pub fn agent(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.get(id)
    }

    fn task_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}

/// Builder that validates the workflow at construction time
///
/// Validation covers task id uniqueness, agent references, dependency
/// references, and graph acyclicity. A cycle is rejected before any task
/// can run.
pub struct WorkflowBuilder {
    agents: Vec<AgentSpec>,
    tasks: Vec<TaskSpec>,
}

impl WorkflowBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Register an agent
    pub fn add_agent(mut self, agent: AgentSpec) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add a task (declaration order is the scheduling tie-break)
    pub fn add_task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }

    /// Validate and build the workflow
    pub fn build(self) -> Result<Workflow> {
        let mut agents = HashMap::new();
        for agent in self.agents {
            let id = agent.id.clone();
            if agents.insert(id.clone(), agent).is_some() {
                return Err(Error::Config(format!("duplicate agent id '{id}'")));
            }
        }

        let mut index = HashMap::new();
        for (i, task) in self.tasks.iter().enumerate() {
            if index.insert(task.id.clone(), i).is_some() {
                return Err(Error::DuplicateTask(task.id.clone()));
            }
            if !agents.contains_key(&task.agent) {
                return Err(Error::UnknownAgent {
                    task: task.id.clone(),
                    agent: task.agent.clone(),
                });
            }
        }
        for task in &self.tasks {
            for dep in &task.depends_on {
                if !index.contains_key(dep) {
                    return Err(Error::missing_dependency(&task.id, dep));
                }
            }
        }

        detect_cycle(&self.tasks, &index)?;

        Ok(Workflow {
            agents,
            tasks: self.tasks,
            index,
        })
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Kahn's algorithm; any task left with unresolved in-degree sits on a cycle
fn detect_cycle(tasks: &[TaskSpec], index: &HashMap<String, usize>) -> Result<()> {
    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, task) in tasks.iter().enumerate() {
        for dep in &task.depends_on {
            if let Some(&d) = index.get(dep) {
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }
    }

    let mut queue: Vec<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut resolved = 0;
    while let Some(i) = queue.pop() {
        resolved += 1;
        for &dep in &dependents[i] {
            in_degree[dep] -= 1;
            if in_degree[dep] == 0 {
                queue.push(dep);
            }
        }
    }

    if resolved < tasks.len() {
        let culprit = tasks
            .iter()
            .enumerate()
            .find(|(i, _)| in_degree[*i] > 0)
            .map(|(_, t)| t.id.clone())
            .unwrap_or_default();
        return Err(Error::CycleDetected(culprit));
    }
    Ok(())
}

/// Runs a workflow to completion, cancellation, or failure
pub struct Orchestrator {
    workflow: Workflow,
    executor: Arc<TaskExecutor>,
    assembler: ContextAssembler,
    config: RunConfig,
}

impl Orchestrator {
    /// Create an orchestrator over a provider boundary
    pub fn new(
        workflow: Workflow,
        provider: Arc<dyn CompletionProvider>,
        config: RunConfig,
    ) -> Result<Self> {
        config.validate()?;
        let executor = Arc::new(TaskExecutor::new(
            provider,
            ExecutorConfig::from_run_config(&config),
        ));
        Ok(Self {
            workflow,
            executor,
            assembler: ContextAssembler::new(),
            config,
        })
    }

    /// Create an orchestrator with an explicit executor (custom retry policy)
    pub fn with_executor(workflow: Workflow, executor: TaskExecutor, config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            workflow,
            executor: Arc::new(executor),
            assembler: ContextAssembler::new(),
            config,
        })
    }

    /// The workflow being orchestrated
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Execute the workflow over the given context
    ///
    /// Always returns a report; task-level failures are contained in it.
    pub async fn run(&self, mut ctx: ExecutionContext) -> RunReport {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.config.timeout();
        let run_id = Uuid::new_v4();
        let query = ctx.query().unwrap_or_default().to_string();

        info!(%run_id, %query, tasks = self.workflow.tasks.len(), "starting workflow run");

        let n = self.workflow.tasks.len();
        let mut statuses = vec![TaskStatus::Pending; n];
        let mut results: Vec<Option<TaskResult>> = vec![None; n];
        let mut join_set: JoinSet<(usize, TaskResult)> = JoinSet::new();
        let mut spawned_ids: HashMap<tokio::task::Id, usize> = HashMap::new();
        let mut cancelled = false;

        loop {
            self.propagate_skips(&mut statuses, &mut results);
            self.dispatch_ready(&ctx, &mut statuses, &mut results, &mut join_set, &mut spawned_ids);

            if statuses.iter().all(|s| s.is_terminal()) {
                break;
            }

            if join_set.is_empty() {
                // No in-flight work can unblock the remaining tasks
                warn!("workflow stalled with non-terminal tasks; skipping the remainder");
                for i in 0..n {
                    if !statuses[i].is_terminal() {
                        statuses[i] = TaskStatus::Skipped;
                        results[i] = Some(TaskResult::skipped(
                            &self.workflow.tasks[i].id,
                            &self.workflow.tasks[i].agent,
                            "no runnable path to this task",
                        ));
                    }
                }
                break;
            }

            match timeout_at(deadline, join_set.join_next_with_id()).await {
                Ok(Some(Ok((_, (idx, result))))) => {
                    self.record_completion(idx, result, &mut ctx, &mut statuses, &mut results);
                }
                Ok(Some(Err(join_err))) => {
                    let idx = spawned_ids.get(&join_err.id()).copied();
                    if let Some(idx) = idx {
                        error!(task = %self.workflow.tasks[idx].id, "task aborted: {join_err}");
                        statuses[idx] = TaskStatus::Failed;
                        let mut result = TaskResult::skipped(
                            &self.workflow.tasks[idx].id,
                            &self.workflow.tasks[idx].agent,
                            format!("execution aborted: {join_err}"),
                        );
                        result.status = TaskStatus::Failed;
                        results[idx] = Some(result);
                    }
                }
                Ok(None) => {
                    // Join set drained between the emptiness check and here
                    continue;
                }
                Err(_) => {
                    warn!(%run_id, "run deadline exceeded, cancelling in-flight tasks");
                    join_set.abort_all();
                    cancelled = true;
                    break;
                }
            }
        }

        if cancelled {
            for i in 0..n {
                if !statuses[i].is_terminal() {
                    statuses[i] = TaskStatus::Cancelled;
                    results[i] = Some(TaskResult::cancelled(
                        &self.workflow.tasks[i].id,
                        &self.workflow.tasks[i].agent,
                    ));
                }
            }
        }

        let status = if cancelled {
            RunStatus::Cancelled
        } else if self
            .workflow
            .tasks
            .iter()
            .enumerate()
            .any(|(i, t)| !t.optional && statuses[i] != TaskStatus::Succeeded)
        {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };

        let results = results
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.unwrap_or_else(|| {
                    TaskResult::skipped(
                        &self.workflow.tasks[i].id,
                        &self.workflow.tasks[i].agent,
                        "no result recorded",
                    )
                })
            })
            .collect();

        info!(%run_id, ?status, elapsed = ?started.elapsed(), "workflow run finished");

        RunReport {
            run_id,
            query,
            status,
            results,
            verdict: None,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            config: self.config.clone(),
        }
    }

    /// Mark tasks whose required prerequisites can no longer succeed
    fn propagate_skips(&self, statuses: &mut [TaskStatus], results: &mut [Option<TaskResult>]) {
        // Skips cascade, so iterate to a fixpoint
        loop {
            let mut changed = false;
            for (i, task) in self.workflow.tasks.iter().enumerate() {
                if statuses[i] != TaskStatus::Pending {
                    continue;
                }
                let blocked = task.depends_on.iter().find(|dep| {
                    self.workflow.task_index(dep).is_some_and(|d| {
                        let dep_optional = self.workflow.tasks[d].optional;
                        !dep_optional
                            && statuses[d].is_terminal()
                            && statuses[d] != TaskStatus::Succeeded
                    })
                });
                if let Some(dep) = blocked {
                    debug!(task = %task.id, prerequisite = %dep, "skipping task");
                    statuses[i] = TaskStatus::Skipped;
                    results[i] = Some(TaskResult::skipped(
                        &task.id,
                        &task.agent,
                        format!("required prerequisite '{dep}' did not succeed"),
                    ));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Dispatch every ready task, in declaration order
    fn dispatch_ready(
        &self,
        ctx: &ExecutionContext,
        statuses: &mut [TaskStatus],
        results: &mut [Option<TaskResult>],
        join_set: &mut JoinSet<(usize, TaskResult)>,
        spawned_ids: &mut HashMap<tokio::task::Id, usize>,
    ) {
        for (i, task) in self.workflow.tasks.iter().enumerate() {
            if statuses[i] != TaskStatus::Pending {
                continue;
            }

            let mut ready = true;
            let mut waived: HashSet<String> = HashSet::new();
            for dep in &task.depends_on {
                let Some(d) = self.workflow.task_index(dep) else {
                    ready = false;
                    break;
                };
                let dep_status = statuses[d];
                if self.workflow.tasks[d].optional {
                    if !dep_status.is_terminal() {
                        ready = false;
                        break;
                    }
                    if dep_status != TaskStatus::Succeeded {
                        waived.insert(dep.clone());
                    }
                } else if dep_status != TaskStatus::Succeeded {
                    ready = false;
                    break;
                }
            }
            if !ready {
                continue;
            }

            let Some(agent) = self.workflow.agent(&task.agent) else {
                // Unreachable after build-time validation
                continue;
            };

            match self.assembler.assemble(task, agent, ctx, &waived) {
                Ok(input) => {
                    debug!(task = %task.id, agent = %agent.id, "dispatching task");
                    statuses[i] = TaskStatus::Running;
                    let executor = Arc::clone(&self.executor);
                    let agent = agent.clone();
                    let handle = join_set
                        .spawn(async move { (i, executor.execute(&agent, input).await) });
                    spawned_ids.insert(handle.id(), i);
                }
                Err(e) => {
                    // Assembly failure is fatal to the task, never dispatched
                    warn!(task = %task.id, error = %e, "context assembly failed");
                    statuses[i] = TaskStatus::Failed;
                    results[i] = Some(TaskResult {
                        task: task.id.clone(),
                        agent: task.agent.clone(),
                        status: TaskStatus::Failed,
                        output: None,
                        error: Some(e.to_string()),
                        attempts: 0,
                        started_at: None,
                        finished_at: Some(chrono::Utc::now()),
                    });
                }
            }
        }
    }

    /// Record a finished task and merge its output into the context
    fn record_completion(
        &self,
        idx: usize,
        result: TaskResult,
        ctx: &mut ExecutionContext,
        statuses: &mut [TaskStatus],
        results: &mut [Option<TaskResult>],
    ) {
        debug!(task = %result.task, status = ?result.status, "task finished");
        statuses[idx] = result.status;
        if result.status == TaskStatus::Succeeded {
            if let Some(output) = &result.output {
                if let Err(e) = ctx.insert_output(&result.task, output.clone()) {
                    // Cannot happen with at-most-once dispatch
                    error!(task = %result.task, error = %e, "dropping duplicate output");
                }
            }
        }
        results[idx] = Some(result);
    }
}
