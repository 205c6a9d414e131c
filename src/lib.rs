//! Retrieval-augmented question answering over a supply-chain graph.
//!
//! Products, suppliers, and warehouses live in a property-graph store;
//! product descriptions carry fixed-length embeddings. A query is embedded,
//! products are ranked by dot-product similarity, and the top matches plus
//! their direct relations become the context for a chat-model answer.

pub mod assistant;
pub mod core;
pub mod llm;
pub mod logging;
pub mod retriever;
pub mod seed;
pub mod store;

pub use assistant::Assistant;
pub use crate::core::config::{AppPaths, Settings};
pub use crate::core::errors::RagError;
pub use llm::{LlmProvider, OpenAiProvider};
pub use retriever::{ContextRetriever, RetrievedContext, RetrieverConfig};
pub use seed::{SeedDataset, SeedLoader};
pub use store::{GraphStore, MemoryGraphStore, Neo4jStore};
