//! Per-run execution context
//!
//! The `ExecutionContext` carries everything a task may consume: outputs of
//! upstream tasks (write-once per task id), externally fetched reference
//! data keyed by source name, and scalar run parameters such as the ticker.
//! It grows monotonically during a run; recorded entries are never mutated.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known parameter keys
pub mod params {
    /// Ticker symbol or free-text query the run is about
    pub const QUERY: &str = "query";
    /// Analysis depth ("quick" or "deep")
    pub const DEPTH: &str = "depth";
    /// Synthesis style for the judge
    pub const STYLE: &str = "style";
}

/// Mutable state accumulated over one workflow run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Task id -> produced output; each id is written exactly once
    outputs: HashMap<String, serde_json::Value>,
    /// Source name -> externally fetched reference data
    references: HashMap<String, serde_json::Value>,
    /// Scalar run parameters available to every template
    params: HashMap<String, serde_json::Value>,
}

impl ExecutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context seeded with the run query
    pub fn for_query(query: impl Into<String>) -> Self {
        let mut ctx = Self::default();
        ctx.set_param(params::QUERY, serde_json::json!(query.into()));
        ctx
    }

    /// Record a task output; errors if the id was already written
    pub fn insert_output(
        &mut self,
        task_id: impl Into<String>,
        output: serde_json::Value,
    ) -> Result<()> {
        let task_id = task_id.into();
        if self.outputs.contains_key(&task_id) {
            return Err(Error::DuplicateOutput(task_id));
        }
        self.outputs.insert(task_id, output);
        Ok(())
    }

    /// Get a task's recorded output
    pub fn output(&self, task_id: &str) -> Option<&serde_json::Value> {
        self.outputs.get(task_id)
    }

    /// Whether a task has a recorded output
    pub fn has_output(&self, task_id: &str) -> bool {
        self.outputs.contains_key(task_id)
    }

    /// All recorded outputs
    pub fn outputs(&self) -> &HashMap<String, serde_json::Value> {
        &self.outputs
    }

    /// Attach externally fetched reference data under a source name
    pub fn insert_reference(&mut self, source: impl Into<String>, data: serde_json::Value) {
        self.references.insert(source.into(), data);
    }

    /// Get reference data by source name
    pub fn reference(&self, source: &str) -> Option<&serde_json::Value> {
        self.references.get(source)
    }

    /// All attached reference data
    pub fn references(&self) -> &HashMap<String, serde_json::Value> {
        &self.references
    }

    /// Set a run parameter
    pub fn set_param(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.params.insert(key.into(), value);
    }

    /// Get a run parameter
    pub fn param(&self, key: &str) -> Option<&serde_json::Value> {
        self.params.get(key)
    }

    /// All run parameters
    pub fn params(&self) -> &HashMap<String, serde_json::Value> {
        &self.params
    }

    /// The run query, if set
    pub fn query(&self) -> Option<&str> {
        self.param(params::QUERY).and_then(|v| v.as_str())
    }
}
