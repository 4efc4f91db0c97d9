//! Workflow engine for oracle-rs
//!
//! Sequences tasks over a dependency DAG, runs independent tasks
//! concurrently against the completion-provider boundary, and merges their
//! outputs into a [`oracle_core::RunReport`].

pub mod assembler;
pub mod executor;
pub mod orchestrator;

pub use assembler::{AssembledInput, ContextAssembler};
pub use executor::{ExecutorConfig, RetryPolicy, TaskExecutor};
pub use orchestrator::{Orchestrator, Workflow, WorkflowBuilder};
