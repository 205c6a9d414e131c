//! Graph store abstraction.
//!
//! The supply-chain graph lives in an external property-graph database.
//! `GraphStore` is the seam between the retrieval core and that database:
//! read-only projections for retrieval, upserts and edge creation for the
//! seed loader. The primary implementation is `Neo4jStore`;
//! `MemoryGraphStore` backs tests and offline runs.

mod memory;
mod neo4j;

pub use memory::MemoryGraphStore;
pub use neo4j::Neo4jStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub location: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub capacity: i64,
}

/// A directed transport edge between two warehouses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    pub distance: i64,
    pub duration: i64,
}

/// A product that carries a description embedding, as projected for ranking.
#[derive(Debug, Clone)]
pub struct ProductCandidate {
    pub id: String,
    pub embedding: Vec<f32>,
}

/// A warehouse reference attached to a product context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseRef {
    pub name: String,
    pub location: String,
}

/// The textual projection of one product and its direct relations.
///
/// Relation lists may contain duplicates; the retriever deduplicates by
/// name when formatting.
#[derive(Debug, Clone)]
pub struct ProductContext {
    pub id: String,
    pub name: String,
    pub description: String,
    pub suppliers: Vec<String>,
    pub warehouses: Vec<WarehouseRef>,
}

/// Node and relationship counts, as reported by the `verify` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub products: usize,
    pub embedded_products: usize,
    pub suppliers: usize,
    pub warehouses: usize,
    pub supplies: usize,
    pub stored_at: usize,
    pub routes: usize,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), RagError>;

    /// Count nodes and relationships by kind.
    async fn stats(&self) -> Result<GraphStats, RagError>;

    /// All products that carry a description embedding, with their vectors.
    ///
    /// Products without an embedding are absent from the result, not
    /// returned with an empty vector.
    async fn embedded_products(&self) -> Result<Vec<ProductCandidate>, RagError>;

    /// Names, descriptions, and direct relations for the given product ids.
    /// Row order is unspecified; missing optional fields come back empty.
    async fn product_context(&self, ids: &[String]) -> Result<Vec<ProductContext>, RagError>;

    /// Declare the cosine vector index over product description embeddings.
    async fn ensure_vector_index(&self, dimensions: usize) -> Result<(), RagError>;

    /// Create or update a product node, optionally attaching an embedding.
    async fn upsert_product(
        &self,
        product: &Product,
        embedding: Option<&[f32]>,
    ) -> Result<(), RagError>;

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<(), RagError>;

    async fn upsert_warehouse(&self, warehouse: &Warehouse) -> Result<(), RagError>;

    /// Create a `SUPPLIES` edge from supplier to product.
    async fn link_supplier(&self, supplier_id: &str, product_id: &str) -> Result<(), RagError>;

    /// Create a `STORED_AT` edge from product to warehouse.
    async fn link_storage(&self, product_id: &str, warehouse_id: &str) -> Result<(), RagError>;

    /// Create a directed `CONNECTED_TO` edge between two warehouses.
    async fn link_route(&self, route: &Route) -> Result<(), RagError>;
}
