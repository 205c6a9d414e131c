//! OpenAI-compatible HTTP provider.
//!
//! Talks to any endpoint exposing the OpenAI `/v1` surface: embeddings,
//! chat completions (plain and SSE streaming), and the models listing used
//! as a health probe.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::config::settings::OpenAiSettings;
use crate::core::errors::RagError;

#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(settings: &OpenAiSettings, timeout: Duration) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::config)?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            chat_model: settings.chat_model.clone(),
            embedding_model: settings.embedding_model.clone(),
            client,
        })
    }

    fn chat_body(&self, request: &ChatRequest, stream: bool) -> Value {
        let mut body = json!({
            "model": &self.chat_model,
            "messages": &request.messages,
            "stream": stream,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        body
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<bool, RagError> {
        let url = format!("{}/v1/models", self.base_url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await;
        match res {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": &self.embedding_model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::embedding)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("embeddings error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(RagError::embedding)?;

        let mut embeddings = Vec::new();
        if let Some(data) = payload["data"].as_array() {
            for item in data {
                if let Some(vals) = item["embedding"].as_array() {
                    let vec: Vec<f32> = vals
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vec);
                }
            }
        }

        if embeddings.len() != inputs.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, RagError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.chat_body(&request, false);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::generation)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Generation(format!("chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(RagError::generation)?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }

    async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::Receiver<Result<String, RagError>>, RagError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.chat_body(&request, true);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::generation)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Generation(format!("chat stream error: {}", text)));
        }

        let (tx, rx) = mpsc::channel(32);
        let mut stream = res.bytes_stream();

        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        let chunk_str = String::from_utf8_lossy(&bytes);
                        for line in chunk_str.lines() {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            if line == "data: [DONE]" {
                                return;
                            }

                            if let Some(data) = line.strip_prefix("data: ") {
                                if let Ok(json) = serde_json::from_str::<Value>(data) {
                                    if let Some(content) =
                                        json["choices"][0]["delta"]["content"].as_str()
                                    {
                                        if !content.is_empty()
                                            && tx.send(Ok(content.to_string())).await.is_err()
                                        {
                                            return;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(RagError::generation(e))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}
