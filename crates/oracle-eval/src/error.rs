//! Evaluation error types

use thiserror::Error;

/// Errors raised while loading rubrics or corpus cases
#[derive(Debug, Error)]
pub enum EvalError {
    /// A corpus directory or case file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A case or rubric file did not parse
    #[error("invalid file '{path}': {message}")]
    InvalidFile { path: String, message: String },

    /// The corpus directory held no case files
    #[error("no case files found in '{0}'")]
    EmptyCorpus(String),

    /// A rubric failed validation
    #[error("invalid rubric: {0}")]
    InvalidRubric(String),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, EvalError>;
