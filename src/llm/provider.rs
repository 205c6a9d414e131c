use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::ChatRequest;
use crate::core::errors::RagError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, RagError>;

    /// generate one fixed-length embedding per input text
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, RagError>;

    /// chat completion (streaming)
    async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<Result<String, RagError>>, RagError>;
}
