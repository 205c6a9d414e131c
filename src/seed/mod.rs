//! Seed loading.
//!
//! Reads a supply-chain dataset from a JSON file and writes it through a
//! `GraphStore`: vector index declaration, one batch embedding call for all
//! product descriptions, entity upserts, then relationship edges. The
//! retrieval core never touches these write paths.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;
use crate::llm::LlmProvider;
use crate::store::{GraphStore, Product, Route, Supplier, Warehouse};

/// Supplier/warehouse assignment for one product, as in the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub product_id: String,
    pub supplier_id: String,
    pub warehouse_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeedDataset {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub warehouses: Vec<Warehouse>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl SeedDataset {
    pub fn from_path(path: &Path) -> Result<Self, RagError> {
        let contents = std::fs::read_to_string(path).map_err(RagError::config)?;
        serde_json::from_str(&contents).map_err(RagError::config)
    }
}

pub struct SeedLoader<'a> {
    store: &'a dyn GraphStore,
    provider: &'a dyn LlmProvider,
    embedding_dimensions: usize,
}

impl<'a> SeedLoader<'a> {
    pub fn new(
        store: &'a dyn GraphStore,
        provider: &'a dyn LlmProvider,
        embedding_dimensions: usize,
    ) -> Self {
        Self {
            store,
            provider,
            embedding_dimensions,
        }
    }

    pub async fn load(&self, dataset: &SeedDataset) -> Result<(), RagError> {
        self.store
            .ensure_vector_index(self.embedding_dimensions)
            .await?;

        tracing::info!("Loading {} products", dataset.products.len());
        let descriptions: Vec<String> = dataset
            .products
            .iter()
            .map(|p| p.description.clone())
            .collect();
        let embeddings = if descriptions.is_empty() {
            Vec::new()
        } else {
            self.provider.embed(&descriptions).await?
        };
        if embeddings.len() != dataset.products.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                dataset.products.len(),
                embeddings.len()
            )));
        }

        for (product, embedding) in dataset.products.iter().zip(embeddings.iter()) {
            if embedding.len() != self.embedding_dimensions {
                return Err(RagError::Embedding(format!(
                    "embedding for product {} has {} dimensions, expected {}",
                    product.id,
                    embedding.len(),
                    self.embedding_dimensions
                )));
            }
            self.store
                .upsert_product(product, Some(embedding))
                .await?;
        }

        tracing::info!("Loading {} suppliers", dataset.suppliers.len());
        for supplier in &dataset.suppliers {
            self.store.upsert_supplier(supplier).await?;
        }

        tracing::info!("Loading {} warehouses", dataset.warehouses.len());
        for warehouse in &dataset.warehouses {
            self.store.upsert_warehouse(warehouse).await?;
        }

        tracing::info!("Loading {} transportation routes", dataset.routes.len());
        for route in &dataset.routes {
            self.store.link_route(route).await?;
        }

        tracing::info!("Creating {} product relationships", dataset.assignments.len());
        for assignment in &dataset.assignments {
            self.store
                .link_supplier(&assignment.supplier_id, &assignment.product_id)
                .await?;
            self.store
                .link_storage(&assignment.product_id, &assignment.warehouse_id)
                .await?;
        }

        tracing::info!("Data loading completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::llm::ChatRequest;
    use crate::retriever::{ContextRetriever, RetrieverConfig};
    use crate::store::MemoryGraphStore;

    /// Deterministic embedder: a few keyword dimensions over the text.
    struct KeywordEmbedder;

    fn keyword_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        ["laptop", "phone", "headphones", "watch", "tablet"]
            .iter()
            .map(|term| if lower.contains(term) { 1.0 } else { 0.0 })
            .collect()
    }

    #[async_trait]
    impl LlmProvider for KeywordEmbedder {
        fn name(&self) -> &str {
            "keyword"
        }

        async fn health_check(&self) -> Result<bool, RagError> {
            Ok(true)
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(inputs.iter().map(|text| keyword_vector(text)).collect())
        }

        async fn chat(&self, _request: ChatRequest) -> Result<String, RagError> {
            Ok(String::new())
        }

        async fn stream_chat(
            &self,
            _request: ChatRequest,
        ) -> Result<mpsc::Receiver<Result<String, RagError>>, RagError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }
    }

    fn dataset_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join("seed.json")
    }

    #[test]
    fn bundled_dataset_parses() {
        let dataset = SeedDataset::from_path(&dataset_path()).unwrap();

        assert_eq!(dataset.products.len(), 5);
        assert_eq!(dataset.suppliers.len(), 5);
        assert_eq!(dataset.warehouses.len(), 5);
        assert_eq!(dataset.routes.len(), 2);
        assert_eq!(dataset.assignments.len(), 10);
    }

    #[tokio::test]
    async fn load_then_retrieve_end_to_end() {
        let dataset = SeedDataset::from_path(&dataset_path()).unwrap();
        let store = Arc::new(MemoryGraphStore::new());
        let provider = Arc::new(KeywordEmbedder);

        SeedLoader::new(store.as_ref(), provider.as_ref(), 5)
            .load(&dataset)
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.products, 5);
        assert_eq!(stats.embedded_products, 5);
        assert_eq!(stats.suppliers, 5);
        assert_eq!(stats.warehouses, 5);
        assert_eq!(stats.supplies, 10);
        assert_eq!(stats.stored_at, 10);
        assert_eq!(stats.routes, 2);

        let retriever = ContextRetriever::new(
            provider.clone(),
            store.clone(),
            RetrieverConfig::default(),
        );

        let context = retriever.retrieve("Which laptop do we stock?").await.unwrap();
        assert!(!context.is_empty());
        assert_eq!(context.products[0].name, "Laptop");

        let text = context.to_text();
        assert!(text.contains("Product: Laptop"));
        assert!(text.contains("Supplied by: "));
        assert!(text.contains("Stored at: "));
    }

    #[tokio::test]
    async fn mismatched_embedding_count_is_an_error() {
        struct ShortEmbedder;

        #[async_trait]
        impl LlmProvider for ShortEmbedder {
            fn name(&self) -> &str {
                "short"
            }

            async fn health_check(&self) -> Result<bool, RagError> {
                Ok(true)
            }

            async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
                Ok(vec![vec![1.0]])
            }

            async fn chat(&self, _request: ChatRequest) -> Result<String, RagError> {
                Ok(String::new())
            }

            async fn stream_chat(
                &self,
                _request: ChatRequest,
            ) -> Result<mpsc::Receiver<Result<String, RagError>>, RagError> {
                let (_tx, rx) = mpsc::channel(1);
                Ok(rx)
            }
        }

        let dataset = SeedDataset::from_path(&dataset_path()).unwrap();
        let store = MemoryGraphStore::new();
        let provider = ShortEmbedder;

        let err = SeedLoader::new(&store, &provider, 5)
            .load(&dataset)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[tokio::test]
    async fn wrong_embedding_dimensions_is_an_error() {
        struct NarrowEmbedder;

        #[async_trait]
        impl LlmProvider for NarrowEmbedder {
            fn name(&self) -> &str {
                "narrow"
            }

            async fn health_check(&self) -> Result<bool, RagError> {
                Ok(true)
            }

            async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
                Ok(inputs.iter().map(|_| vec![1.0, 0.0]).collect())
            }

            async fn chat(&self, _request: ChatRequest) -> Result<String, RagError> {
                Ok(String::new())
            }

            async fn stream_chat(
                &self,
                _request: ChatRequest,
            ) -> Result<mpsc::Receiver<Result<String, RagError>>, RagError> {
                let (_tx, rx) = mpsc::channel(1);
                Ok(rx)
            }
        }

        let dataset = SeedDataset::from_path(&dataset_path()).unwrap();
        let store = MemoryGraphStore::new();
        let provider = NarrowEmbedder;

        let err = SeedLoader::new(&store, &provider, 5)
            .load(&dataset)
            .await
            .unwrap_err();
        match err {
            RagError::Embedding(message) => {
                assert!(message.contains("2 dimensions, expected 5"), "{}", message)
            }
            other => panic!("expected an embedding error, got {:?}", other),
        }
    }
}
