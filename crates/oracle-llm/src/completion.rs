//! Completion request and response types

use serde::{Deserialize, Serialize};

/// A single prompt-like request to a completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// System prompt (persona and goal of the invoking agent)
    pub system: Option<String>,
    /// The assembled task prompt
    pub prompt: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum completion tokens
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    /// Create a builder for a completion request
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }
}

/// Builder for [`CompletionRequest`]
#[derive(Debug)]
pub struct CompletionRequestBuilder {
    model: String,
    system: Option<String>,
    prompt: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
}

impl CompletionRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: String::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the user prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max completion tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the request
    pub fn build(self) -> CompletionRequest {
        CompletionRequest {
            model: self.model,
            system: self.system,
            prompt: self.prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: usize,
    /// Tokens in the completion
    pub completion_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used
    pub fn total(&self) -> usize {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Response from a completion provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Model that produced the response
    pub model: String,
    /// Token usage, when reported
    pub usage: Option<TokenUsage>,
}
