//! Analyst catalog for oracle-rs
//!
//! The concrete agents behind a company analysis: a financial analyst, a
//! profile researcher, a news analyst, and an investment judge that
//! synthesizes their outputs into a rating. [`run_company_analysis`] wires
//! the catalog to the workflow engine and the reference-data client.

pub mod analysis;
pub mod catalog;
pub mod extract;
pub mod prompts;

pub use analysis::run_company_analysis;
pub use catalog::{build_workflow, sources, tasks};
pub use extract::{extract_json_like, parse_verdict};
