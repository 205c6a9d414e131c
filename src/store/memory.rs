//! In-process graph store.
//!
//! Holds the supply-chain graph in plain maps behind a lock. Used by the
//! test suite and for offline runs where no Neo4j instance is available.
//! Iteration order is by id (BTreeMap), so projections are deterministic.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{
    GraphStats, GraphStore, Product, ProductCandidate, ProductContext, Route, Supplier,
    Warehouse, WarehouseRef,
};
use crate::core::errors::RagError;

#[derive(Default)]
struct MemoryInner {
    products: BTreeMap<String, (Product, Option<Vec<f32>>)>,
    suppliers: BTreeMap<String, Supplier>,
    warehouses: BTreeMap<String, Warehouse>,
    /// (supplier_id, product_id) edges; duplicates allowed, as in the graph.
    supplies: Vec<(String, String)>,
    /// (product_id, warehouse_id) edges; duplicates allowed.
    stored_at: Vec<(String, String)>,
    routes: Vec<Route>,
}

#[derive(Default)]
pub struct MemoryGraphStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryInner>, RagError> {
        self.inner
            .read()
            .map_err(|_| RagError::Store("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryInner>, RagError> {
        self.inner
            .write()
            .map_err(|_| RagError::Store("memory store lock poisoned".into()))
    }

}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn ping(&self) -> Result<(), RagError> {
        self.read().map(|_| ())
    }

    async fn stats(&self) -> Result<GraphStats, RagError> {
        let inner = self.read()?;
        Ok(GraphStats {
            products: inner.products.len(),
            embedded_products: inner
                .products
                .values()
                .filter(|(_, embedding)| embedding.is_some())
                .count(),
            suppliers: inner.suppliers.len(),
            warehouses: inner.warehouses.len(),
            supplies: inner.supplies.len(),
            stored_at: inner.stored_at.len(),
            routes: inner.routes.len(),
        })
    }

    async fn embedded_products(&self) -> Result<Vec<ProductCandidate>, RagError> {
        let inner = self.read()?;
        Ok(inner
            .products
            .values()
            .filter_map(|(product, embedding)| {
                embedding.as_ref().map(|embedding| ProductCandidate {
                    id: product.id.clone(),
                    embedding: embedding.clone(),
                })
            })
            .collect())
    }

    async fn product_context(&self, ids: &[String]) -> Result<Vec<ProductContext>, RagError> {
        let inner = self.read()?;
        let mut contexts = Vec::new();

        for id in ids {
            let Some((product, _)) = inner.products.get(id) else {
                continue;
            };

            let suppliers = inner
                .supplies
                .iter()
                .filter(|(_, product_id)| product_id == id)
                .filter_map(|(supplier_id, _)| inner.suppliers.get(supplier_id))
                .map(|s| s.name.clone())
                .collect();

            let warehouses = inner
                .stored_at
                .iter()
                .filter(|(product_id, _)| product_id == id)
                .filter_map(|(_, warehouse_id)| inner.warehouses.get(warehouse_id))
                .map(|w| WarehouseRef {
                    name: w.name.clone(),
                    location: w.location.clone(),
                })
                .collect();

            contexts.push(ProductContext {
                id: product.id.clone(),
                name: product.name.clone(),
                description: product.description.clone(),
                suppliers,
                warehouses,
            });
        }

        Ok(contexts)
    }

    async fn ensure_vector_index(&self, _dimensions: usize) -> Result<(), RagError> {
        // No index to declare; the in-memory scan is already exhaustive.
        Ok(())
    }

    async fn upsert_product(
        &self,
        product: &Product,
        embedding: Option<&[f32]>,
    ) -> Result<(), RagError> {
        let mut inner = self.write()?;
        inner.products.insert(
            product.id.clone(),
            (product.clone(), embedding.map(|e| e.to_vec())),
        );
        Ok(())
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<(), RagError> {
        let mut inner = self.write()?;
        inner.suppliers.insert(supplier.id.clone(), supplier.clone());
        Ok(())
    }

    async fn upsert_warehouse(&self, warehouse: &Warehouse) -> Result<(), RagError> {
        let mut inner = self.write()?;
        inner
            .warehouses
            .insert(warehouse.id.clone(), warehouse.clone());
        Ok(())
    }

    async fn link_supplier(&self, supplier_id: &str, product_id: &str) -> Result<(), RagError> {
        let mut inner = self.write()?;
        inner
            .supplies
            .push((supplier_id.to_string(), product_id.to_string()));
        Ok(())
    }

    async fn link_storage(&self, product_id: &str, warehouse_id: &str) -> Result<(), RagError> {
        let mut inner = self.write()?;
        inner
            .stored_at
            .push((product_id.to_string(), warehouse_id.to_string()));
        Ok(())
    }

    async fn link_route(&self, route: &Route) -> Result<(), RagError> {
        let mut inner = self.write()?;
        inner.routes.push(route.clone());
        Ok(())
    }
}
