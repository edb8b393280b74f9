//! In-memory replica of the catalog.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Category, CategoryId, Product, ProductId};
use futures_util::stream;
use store::CatalogSnapshot;
use tokio::sync::RwLock;

use crate::{QueryError, Result};
use crate::read_model::{ProductRows, ReadModel, matches_keyword};

#[derive(Default)]
struct ReplicaState {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    synced_at: Option<DateTime<Utc>>,
}

/// Case-insensitive name order, ties broken by the exact name.
///
/// Mirrors `ORDER BY lower(name) COLLATE "C", name COLLATE "C"` in the
/// PostgreSQL read model.
fn name_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl ReplicaState {
    fn products_by_name(&self) -> Vec<Product> {
        let mut products: Vec<_> = self.products.values().cloned().collect();
        products.sort_by(|a, b| name_order(a.name().value(), b.name().value()));
        products
    }
}

/// Read-only copy of the catalog, replaced wholesale by the replicator.
///
/// Readers never observe a partially applied snapshot.
#[derive(Clone, Default)]
pub struct ReplicaStore {
    state: Arc<RwLock<ReplicaState>>,
}

impl ReplicaStore {
    /// Creates a new empty replica.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the replica contents with `snapshot`.
    pub async fn apply(&self, snapshot: CatalogSnapshot) -> DateTime<Utc> {
        let categories = snapshot
            .categories
            .into_iter()
            .map(|category| (category.id(), category))
            .collect();
        let products = snapshot
            .products
            .into_iter()
            .map(|product| (product.id(), product))
            .collect();
        let synced_at = Utc::now();

        let mut state = self.state.write().await;
        state.categories = categories;
        state.products = products;
        state.synced_at = Some(synced_at);
        synced_at
    }

    /// Time of the last applied snapshot, `None` before the first one.
    pub async fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.synced_at
    }
}

#[async_trait]
impl ReadModel for ReplicaStore {
    fn name(&self) -> &'static str {
        "ReplicaStore"
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories: Vec<_> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| name_order(a.name().value(), b.name().value()));
        Ok(categories)
    }

    async fn category(&self, id: &CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(id).cloned())
    }

    async fn products(&self) -> Result<Vec<Product>> {
        Ok(self.state.read().await.products_by_name())
    }

    async fn product(&self, id: &ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(id).cloned())
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>> {
        let mut products = self.state.read().await.products_by_name();
        products.retain(|product| matches_keyword(product.name().value(), keyword));
        Ok(products)
    }

    async fn stream_products(&self) -> Result<ProductRows> {
        let products = self.state.read().await.products_by_name();
        Ok(Box::pin(stream::iter(products.into_iter().map(Ok::<_, QueryError>))))
    }
}
