//! Agent invocation boundary for oracle-rs
//!
//! The workflow engine treats the underlying language model as a black box
//! behind the [`CompletionProvider`] trait. This crate defines that trait,
//! the request/response types, and an OpenAI-compatible HTTP provider.

pub mod completion;
pub mod error;
pub mod provider;
pub mod providers;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{LLMError, Result};
pub use provider::CompletionProvider;
