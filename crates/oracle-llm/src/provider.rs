//! Completion provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for completion providers
///
/// Implementations give access to a language model service. The workflow
/// engine only depends on this contract: accept a prompt-like payload,
/// return text, or fail with an error classified transient or permanent.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g. "openai")
    fn name(&self) -> &str;
}
