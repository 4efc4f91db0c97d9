//! Error types for oracle-core

use thiserror::Error;

/// Result type alias for oracle-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared across the workflow engine
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Context assembly found no output for a declared prerequisite or
    /// reference source
    #[error("missing dependency '{dependency}' for task '{task}'")]
    MissingDependency { task: String, dependency: String },

    /// External call failed recoverably; the executor may retry
    #[error("transient failure: {0}")]
    Transient(String),

    /// External call failed unrecoverably, or retries were exhausted
    #[error("permanent failure: {0}")]
    Permanent(String),

    /// The task dependency graph contains a cycle
    #[error("dependency cycle detected involving task '{0}'")]
    CycleDetected(String),

    /// A per-task or per-run deadline was exceeded
    #[error("timed out after {0:.1}s")]
    Timeout(f64),

    /// The run was aborted before the task could finish
    #[error("cancelled")]
    Cancelled,

    /// Two task specs share the same id
    #[error("duplicate task id '{0}'")]
    DuplicateTask(String),

    /// A task references an agent id that was never registered
    #[error("task '{task}' references unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    /// A task output was recorded twice for the same id
    #[error("output already recorded for task '{0}'")]
    DuplicateOutput(String),

    /// Instruction template failed to render
    #[error("template error in task '{task}': {message}")]
    Template { task: String, message: String },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error class is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    /// Convenience constructor for missing-dependency errors
    pub fn missing_dependency(task: impl Into<String>, dependency: impl Into<String>) -> Self {
        Error::MissingDependency {
            task: task.into(),
            dependency: dependency.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_dependency("judge", "news_analysis");
        assert_eq!(
            err.to_string(),
            "missing dependency 'news_analysis' for task 'judge'"
        );

        let err = Error::CycleDetected("a".to_string());
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::Transient("503".to_string()).is_transient());
        assert!(!Error::Permanent("401".to_string()).is_transient());
        assert!(!Error::Cancelled.is_transient());
    }
}
