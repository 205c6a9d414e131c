//! Context retrieval.
//!
//! `ContextRetriever` turns a free-text query into a ranked textual context
//! block: embed the query, score every embedded product by dot product,
//! keep the top-k, fetch their suppliers and warehouses, and format the
//! result. Provider and store are injected so tests can substitute fakes.

pub mod ranking;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::settings::RetrievalSettings;
use crate::core::errors::RagError;
use crate::llm::LlmProvider;
use crate::store::{GraphStore, WarehouseRef};

/// Returned by the sentinel surface when the store holds no embedded products.
pub const NO_CONTEXT_FOUND: &str = "No relevant context found.";
/// Returned by the sentinel surface when embedding or store access fails.
pub const RETRIEVAL_ERROR: &str = "Error retrieving context.";

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// How many products make it into the context.
    pub top_k: usize,
    /// Upper bound on each of the two network calls.
    pub request_timeout: Duration,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&RetrievalSettings> for RetrieverConfig {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            top_k: settings.top_k,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

/// One product block of the assembled context, in ranked order.
#[derive(Debug, Clone)]
pub struct RankedProduct {
    pub id: String,
    pub score: f32,
    pub name: String,
    pub description: String,
    /// Distinct supplier names, first-seen order.
    pub suppliers: Vec<String>,
    /// Distinct warehouses by name, first-seen order.
    pub warehouses: Vec<WarehouseRef>,
}

/// The ranked context for one query. Empty when no product carries an
/// embedding — distinct from a retrieval failure, which is an error.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    pub products: Vec<RankedProduct>,
}

impl RetrievedContext {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Render the literal context block handed to the generation step.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        for product in &self.products {
            lines.push(format!("Product: {}", product.name));
            lines.push(format!("Description: {}", product.description));
            for supplier in &product.suppliers {
                if !supplier.is_empty() {
                    lines.push(format!("Supplied by: {}", supplier));
                }
            }
            for warehouse in &product.warehouses {
                if !warehouse.name.is_empty() {
                    lines.push(format!(
                        "Stored at: {} in {}",
                        warehouse.name, warehouse.location
                    ));
                }
            }
            lines.push("---".to_string());
        }

        lines.join("\n")
    }
}

impl fmt::Display for RetrievedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

pub struct ContextRetriever {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn GraphStore>,
    config: RetrieverConfig,
}

impl ContextRetriever {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn GraphStore>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Retrieve the ranked context for a query.
    ///
    /// Exactly one embedding call and one set of read-only store queries;
    /// never writes. Failures come back as tagged errors, an unseeded store
    /// as an empty (not erroneous) context.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext, RagError> {
        let embeddings = self
            .bounded(self.provider.embed(&[query.to_string()]))
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("provider returned no embedding".into()))?;

        let candidates = self.bounded(self.store.embedded_products()).await?;
        let ranked = ranking::rank_top_k(&candidates, &query_embedding, self.config.top_k);
        if ranked.is_empty() {
            return Ok(RetrievedContext::default());
        }

        let ids: Vec<String> = ranked.iter().map(|s| s.id.clone()).collect();
        let contexts = self.bounded(self.store.product_context(&ids)).await?;

        // Store rows come back in arbitrary order; restore ranked order and
        // drop duplicate relations by name.
        let mut products = Vec::with_capacity(ranked.len());
        for scored in &ranked {
            let Some(context) = contexts.iter().find(|c| c.id == scored.id) else {
                continue;
            };
            products.push(RankedProduct {
                id: context.id.clone(),
                score: scored.score,
                name: context.name.clone(),
                description: context.description.clone(),
                suppliers: distinct_names(&context.suppliers),
                warehouses: distinct_warehouses(&context.warehouses),
            });
        }

        Ok(RetrievedContext { products })
    }

    /// Sentinel-string surface kept for compatibility with the original
    /// behavior: failures and empty results collapse into fixed strings.
    pub async fn retrieve_context(&self, query: &str) -> String {
        match self.retrieve(query).await {
            Ok(context) if context.is_empty() => NO_CONTEXT_FOUND.to_string(),
            Ok(context) => context.to_text(),
            Err(err) => {
                tracing::warn!("context retrieval failed: {}", err);
                RETRIEVAL_ERROR.to_string()
            }
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, RagError>>,
    ) -> Result<T, RagError> {
        tokio::time::timeout(self.config.request_timeout, fut)
            .await
            .map_err(|_| RagError::Timeout(self.config.request_timeout))?
    }
}

fn distinct_names(names: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for name in names {
        if !seen.contains(name) {
            seen.push(name.clone());
        }
    }
    seen
}

fn distinct_warehouses(warehouses: &[WarehouseRef]) -> Vec<WarehouseRef> {
    let mut seen: Vec<WarehouseRef> = Vec::new();
    for warehouse in warehouses {
        if !seen.iter().any(|w| w.name == warehouse.name) {
            seen.push(warehouse.clone());
        }
    }
    seen
}
