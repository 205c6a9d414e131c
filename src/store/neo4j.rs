//! Neo4j-backed graph store.
//!
//! Issues parameterized Cypher over bolt. Retrieval uses two read-only
//! projections (embedded candidates, then relations for the selected ids);
//! similarity ranking itself happens in-process, not in the query.

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};

use super::{
    GraphStats, GraphStore, Product, ProductCandidate, ProductContext, Route, Supplier,
    Warehouse, WarehouseRef,
};
use crate::core::config::settings::Neo4jSettings;
use crate::core::errors::RagError;

pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub async fn connect(settings: &Neo4jSettings) -> Result<Self, RagError> {
        let config = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.username.as_str())
            .password(settings.password.as_str())
            .build()
            .map_err(RagError::store)?;

        let graph = Graph::connect(config).await.map_err(RagError::store)?;
        Ok(Self { graph })
    }

    async fn count(&self, statement: &str) -> Result<usize, RagError> {
        let mut rows = self
            .graph
            .execute(query(statement))
            .await
            .map_err(RagError::store)?;

        let row = rows
            .next()
            .await
            .map_err(RagError::store)?
            .ok_or_else(|| RagError::Store("count query returned no rows".into()))?;
        let value: i64 = row.get("count").map_err(RagError::store)?;
        Ok(value.max(0) as usize)
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ping(&self) -> Result<(), RagError> {
        let mut rows = self
            .graph
            .execute(query("RETURN 1 AS test"))
            .await
            .map_err(RagError::store)?;

        let row = rows
            .next()
            .await
            .map_err(RagError::store)?
            .ok_or_else(|| RagError::Store("ping returned no rows".into()))?;
        let value: i64 = row.get("test").map_err(RagError::store)?;
        if value != 1 {
            return Err(RagError::Store("ping returned unexpected value".into()));
        }
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, RagError> {
        Ok(GraphStats {
            products: self.count("MATCH (p:Product) RETURN count(p) AS count").await?,
            embedded_products: self
                .count(
                    "MATCH (p:Product)
                     WHERE p.description_embedding IS NOT NULL
                     RETURN count(p) AS count",
                )
                .await?,
            suppliers: self
                .count("MATCH (s:Supplier) RETURN count(s) AS count")
                .await?,
            warehouses: self
                .count("MATCH (w:Warehouse) RETURN count(w) AS count")
                .await?,
            supplies: self
                .count("MATCH ()-[r:SUPPLIES]->() RETURN count(r) AS count")
                .await?,
            stored_at: self
                .count("MATCH ()-[r:STORED_AT]->() RETURN count(r) AS count")
                .await?,
            routes: self
                .count("MATCH ()-[r:CONNECTED_TO]->() RETURN count(r) AS count")
                .await?,
        })
    }

    async fn embedded_products(&self) -> Result<Vec<ProductCandidate>, RagError> {
        let mut rows = self
            .graph
            .execute(query(
                "MATCH (p:Product)
                 WHERE p.description_embedding IS NOT NULL
                 RETURN p.id AS id, p.description_embedding AS embedding",
            ))
            .await
            .map_err(RagError::store)?;

        let mut candidates = Vec::new();
        while let Some(row) = rows.next().await.map_err(RagError::store)? {
            let id: String = row.get("id").map_err(RagError::store)?;
            let embedding: Vec<f64> = row.get("embedding").map_err(RagError::store)?;
            candidates.push(ProductCandidate {
                id,
                embedding: embedding.into_iter().map(|v| v as f32).collect(),
            });
        }

        Ok(candidates)
    }

    async fn product_context(&self, ids: &[String]) -> Result<Vec<ProductContext>, RagError> {
        // One row per (product, supplier, warehouse) combination; grouped
        // back into per-product contexts below.
        let mut rows = self
            .graph
            .execute(
                query(
                    "MATCH (p:Product)
                     WHERE p.id IN $ids
                     OPTIONAL MATCH (p)<-[:SUPPLIES]-(s:Supplier)
                     OPTIONAL MATCH (p)-[:STORED_AT]->(w:Warehouse)
                     RETURN p.id AS id, p.name AS name, p.description AS description,
                            s.name AS supplier,
                            w.name AS warehouse, w.location AS warehouse_location",
                )
                .param("ids", ids.to_vec()),
            )
            .await
            .map_err(RagError::store)?;

        let mut contexts: Vec<ProductContext> = Vec::new();
        while let Some(row) = rows.next().await.map_err(RagError::store)? {
            let id: String = row.get("id").map_err(RagError::store)?;
            let name = row.get::<Option<String>>("name").ok().flatten();
            let description = row.get::<Option<String>>("description").ok().flatten();
            let supplier = row.get::<Option<String>>("supplier").ok().flatten();
            let warehouse = row.get::<Option<String>>("warehouse").ok().flatten();
            let warehouse_location = row
                .get::<Option<String>>("warehouse_location")
                .ok()
                .flatten();

            let idx = match contexts.iter().position(|c| c.id == id) {
                Some(idx) => idx,
                None => {
                    contexts.push(ProductContext {
                        id: id.clone(),
                        name: name.unwrap_or_default(),
                        description: description.unwrap_or_default(),
                        suppliers: Vec::new(),
                        warehouses: Vec::new(),
                    });
                    contexts.len() - 1
                }
            };
            let entry = &mut contexts[idx];

            if let Some(supplier) = supplier {
                entry.suppliers.push(supplier);
            }
            if let Some(name) = warehouse {
                entry.warehouses.push(WarehouseRef {
                    name,
                    location: warehouse_location.unwrap_or_default(),
                });
            }
        }

        Ok(contexts)
    }

    async fn ensure_vector_index(&self, dimensions: usize) -> Result<(), RagError> {
        // Index options do not accept parameters; dimensions is a trusted
        // numeric config value.
        let statement = format!(
            "CREATE VECTOR INDEX product_description_embeddings IF NOT EXISTS
             FOR (p:Product) ON (p.description_embedding)
             OPTIONS {{indexConfig: {{
                 `vector.dimensions`: {},
                 `vector.similarity_function`: 'cosine'
             }}}}",
            dimensions
        );

        self.graph
            .run(query(&statement))
            .await
            .map_err(RagError::store)
    }

    async fn upsert_product(
        &self,
        product: &Product,
        embedding: Option<&[f32]>,
    ) -> Result<(), RagError> {
        let statement = if embedding.is_some() {
            "MERGE (p:Product {id: $id})
             SET p.name = $name,
                 p.description = $description,
                 p.price = $price,
                 p.category = $category,
                 p.description_embedding = $embedding"
        } else {
            "MERGE (p:Product {id: $id})
             SET p.name = $name,
                 p.description = $description,
                 p.price = $price,
                 p.category = $category"
        };

        let mut q = query(statement)
            .param("id", product.id.as_str())
            .param("name", product.name.as_str())
            .param("description", product.description.as_str())
            .param("price", product.price)
            .param("category", product.category.as_str());
        if let Some(embedding) = embedding {
            let vector: Vec<f64> = embedding.iter().map(|v| *v as f64).collect();
            q = q.param("embedding", vector);
        }

        self.graph.run(q).await.map_err(RagError::store)
    }

    async fn upsert_supplier(&self, supplier: &Supplier) -> Result<(), RagError> {
        self.graph
            .run(
                query(
                    "MERGE (s:Supplier {id: $id})
                     SET s.name = $name,
                         s.location = $location,
                         s.specialization = $specialization",
                )
                .param("id", supplier.id.as_str())
                .param("name", supplier.name.as_str())
                .param("location", supplier.location.as_str())
                .param("specialization", supplier.specialization.as_str()),
            )
            .await
            .map_err(RagError::store)
    }

    async fn upsert_warehouse(&self, warehouse: &Warehouse) -> Result<(), RagError> {
        self.graph
            .run(
                query(
                    "MERGE (w:Warehouse {id: $id})
                     SET w.name = $name,
                         w.location = $location,
                         w.capacity = $capacity",
                )
                .param("id", warehouse.id.as_str())
                .param("name", warehouse.name.as_str())
                .param("location", warehouse.location.as_str())
                .param("capacity", warehouse.capacity),
            )
            .await
            .map_err(RagError::store)
    }

    async fn link_supplier(&self, supplier_id: &str, product_id: &str) -> Result<(), RagError> {
        self.graph
            .run(
                query(
                    "MATCH (s:Supplier {id: $supplier_id})
                     MATCH (p:Product {id: $product_id})
                     MERGE (s)-[:SUPPLIES]->(p)",
                )
                .param("supplier_id", supplier_id)
                .param("product_id", product_id),
            )
            .await
            .map_err(RagError::store)
    }

    async fn link_storage(&self, product_id: &str, warehouse_id: &str) -> Result<(), RagError> {
        self.graph
            .run(
                query(
                    "MATCH (p:Product {id: $product_id})
                     MATCH (w:Warehouse {id: $warehouse_id})
                     MERGE (p)-[:STORED_AT]->(w)",
                )
                .param("product_id", product_id)
                .param("warehouse_id", warehouse_id),
            )
            .await
            .map_err(RagError::store)
    }

    async fn link_route(&self, route: &Route) -> Result<(), RagError> {
        self.graph
            .run(
                query(
                    "MATCH (w1:Warehouse {id: $from})
                     MATCH (w2:Warehouse {id: $to})
                     MERGE (w1)-[r:CONNECTED_TO]->(w2)
                     SET r.distance = $distance,
                         r.duration = $duration",
                )
                .param("from", route.from.as_str())
                .param("to", route.to.as_str())
                .param("distance", route.distance)
                .param("duration", route.duration),
            )
            .await
            .map_err(RagError::store)
    }
}
