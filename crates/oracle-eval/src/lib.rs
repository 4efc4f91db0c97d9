//! Evaluation harness for oracle-rs
//!
//! Deterministic, rubric-weighted scoring of analysis reports. Each check
//! is a pure function over a report plus optional expectations; a rubric
//! assigns the weights. Runs offline over saved reports, never in the
//! interactive analysis path.

pub mod checks;
pub mod corpus;
pub mod error;
pub mod rubric;
pub mod score;

pub use corpus::{evaluate, CaseScore, CorpusSummary, EvalCase};
pub use error::EvalError;
pub use rubric::{CheckKind, Expectations, Rubric, WeightedCheck};
pub use score::{score, CheckScore, ScoreResult};
