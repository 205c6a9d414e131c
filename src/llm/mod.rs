//! LLM provider abstraction.
//!
//! `LlmProvider` covers the two upstream calls the pipeline needs:
//! embedding generation and chat completion. The concrete implementation
//! is `OpenAiProvider`; tests substitute deterministic fakes.

pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAiProvider;
pub use provider::LlmProvider;
pub use types::{ChatMessage, ChatRequest};
