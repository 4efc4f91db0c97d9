//! Core abstractions for oracle-rs
//!
//! This crate defines the data model shared across the workspace: static
//! agent and task descriptions, the per-run execution context, task results
//! and run reports, and the common error taxonomy.

pub mod config;
pub mod context;
pub mod error;
pub mod report;
pub mod spec;

pub use config::{Depth, RunConfig, Style};
pub use context::{params, ExecutionContext};
pub use error::{Error, Result};
pub use report::{RunReport, RunStatus, TaskResult, TaskStatus, Verdict};
pub use spec::{AgentSpec, TaskSpec};
