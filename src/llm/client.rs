//! LLM client abstraction
//!
//! Planning and synthesis both talk to a text-generation model through the
//! [`LLMClient`] trait. Any OpenAI-compatible endpoint (OpenAI, Cerebras,
//! OpenRouter, a local llama.cpp or vLLM server) is served by
//! [`OpenAICompatClient`](super::openai::OpenAICompatClient).

use crate::types::Result;
use async_trait::async_trait;

/// Generation parameters for a single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the client's default model when set
    pub model: Option<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.2,
            model: None,
        }
    }
}

impl CompletionOptions {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Generic LLM client trait for provider abstraction
///
/// Implementations return the whole response text; an empty answer is
/// reported as an error rather than an empty string.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt with explicit parameters
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;

    /// Generate a completion with default parameters
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(prompt, &CompletionOptions::default()).await
    }

    /// Get the default model name/identifier
    fn model_name(&self) -> &str;
}
