//! Read model trait for the query side.

use std::pin::Pin;

use async_trait::async_trait;
use domain::{Category, CategoryId, Product, ProductId};
use futures_core::Stream;

use crate::Result;

/// Stream of products produced by [`ReadModel::stream_products`].
pub type ProductRows = Pin<Box<dyn Stream<Item = Result<Product>> + Send>>;

/// Read access to a (possibly lagging) copy of the catalog.
///
/// Absent entities are `None`, never an error. Products always carry their
/// joined category.
#[async_trait]
pub trait ReadModel: Send + Sync {
    /// Returns the name of this read model.
    fn name(&self) -> &'static str;

    /// All categories ordered by name, case-insensitively.
    async fn categories(&self) -> Result<Vec<Category>>;

    async fn category(&self, id: &CategoryId) -> Result<Option<Category>>;

    /// All products ordered by name, case-insensitively.
    async fn products(&self) -> Result<Vec<Product>>;

    async fn product(&self, id: &ProductId) -> Result<Option<Product>>;

    /// Products whose name contains `keyword`, ignoring case.
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>>;

    /// Every product, delivered incrementally.
    async fn stream_products(&self) -> Result<ProductRows>;
}

/// Case-insensitive substring match used by the in-process read models.
pub(crate) fn matches_keyword(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}
