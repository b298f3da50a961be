//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the text-generation calls the
//! research pipeline makes: query analysis during planning and the final
//! synthesis of subagent findings.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait every provider implements
//! - [`CompletionOptions`] - Per-call token budget, temperature and model
//! - [`OpenAICompatClient`] - Client for OpenAI-compatible chat completion APIs
//!
//! # Example
//!
//! ```ignore
//! use multiscout::llm::{CompletionOptions, LLMClient, OpenAICompatClient};
//!
//! let client = OpenAICompatClient::from_config(&config.llm)?;
//! let options = CompletionOptions::new(500, 0.2);
//!
//! let answer = client.complete("What is 2+2?", &options).await?;
//! println!("{}", answer);
//! ```

/// Core LLM client trait and completion options.
pub mod client;
/// OpenAI-compatible HTTP client.
pub mod openai;

pub use client::{CompletionOptions, LLMClient};
pub use openai::OpenAICompatClient;
