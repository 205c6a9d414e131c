//! Question answering over the retrieved context.
//!
//! Builds the fixed supply-chain prompt around the retrieved context and
//! forwards it to the chat provider.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::errors::RagError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::retriever::ContextRetriever;

const PROMPT_TEMPLATE: &str = "You are a helpful supply chain assistant. Use the following context to answer the question.
If you don't know the answer, just say that you don't know. Use three sentences maximum and keep the answer concise.

Context: {context}

Question: {question}

Answer:";

pub fn build_prompt(context: &str, question: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

pub struct Assistant {
    retriever: ContextRetriever,
    provider: Arc<dyn LlmProvider>,
}

impl Assistant {
    pub fn new(retriever: ContextRetriever, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            retriever,
            provider,
        }
    }

    /// Answer a question, degrading every failure to a user-visible string.
    ///
    /// Retrieval failures are folded into the context sentinel before the
    /// generation call, as in the original pipeline; generation failures
    /// surface as "Error processing question: <details>".
    pub async fn ask(&self, question: &str) -> String {
        match self.answer(question).await {
            Ok(answer) => answer,
            Err(err) => format!("Error processing question: {}", err),
        }
    }

    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let context = self.retriever.retrieve_context(question).await;
        let prompt = build_prompt(&context, question);

        self.provider
            .chat(ChatRequest::new(vec![ChatMessage::user(prompt)]))
            .await
    }

    /// Streaming variant for the interactive loop.
    pub async fn stream_answer(
        &self,
        question: &str,
    ) -> Result<mpsc::Receiver<Result<String, RagError>>, RagError> {
        let context = self.retriever.retrieve_context(question).await;
        let prompt = build_prompt(&context, question);

        self.provider
            .stream_chat(ChatRequest::new(vec![ChatMessage::user(prompt)]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = build_prompt("Product: Laptop\n---", "Where is the laptop stored?");

        assert!(prompt.starts_with("You are a helpful supply chain assistant."));
        assert!(prompt.contains("Context: Product: Laptop\n---"));
        assert!(prompt.contains("Question: Where is the laptop stored?"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }
}
