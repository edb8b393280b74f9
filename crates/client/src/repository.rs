//! CQRS repository over a command and a query backend.

use common::{
    CommandBackend, CreateCategoryRequest, CreateProductRequest, QueryBackend,
    UpdateCategoryRequest, UpdateProductRequest,
};
use domain::{Category, CategoryId, Product, ProductId};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::stream::{ProductReceiver, spawn_bridge};

/// One logical catalog repository split over two backends.
///
/// Writes go to the command backend and reads to the query backend, one
/// backend call per operation. Nothing is tracked locally, so a read issued
/// right after a write may not observe it yet.
pub struct CqrsRepository<C: CommandBackend, Q: QueryBackend> {
    command: C,
    query: Q,
}

impl<C: CommandBackend, Q: QueryBackend> CqrsRepository<C, Q> {
    /// Creates a new repository over the two backends.
    pub fn new(command: C, query: Q) -> Self {
        Self { command, query }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let dto = self
            .command
            .create_category(CreateCategoryRequest {
                name: name.to_string(),
            })
            .await?;
        Ok(Category::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self, category), fields(category_id = %category.id()))]
    pub async fn update_category(&self, category: &Category) -> Result<Category> {
        let dto = self
            .command
            .update_category(UpdateCategoryRequest {
                id: category.id().value(),
                name: category.name().value().to_string(),
            })
            .await?;
        Ok(Category::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: &CategoryId) -> Result<Category> {
        let dto = self.command.delete_category(id.value()).await?;
        Ok(Category::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self, category), fields(category_id = %category.id()))]
    pub async fn create_product(&self, name: &str, price: u32, category: &Category) -> Result<Product> {
        let dto = self
            .command
            .create_product(CreateProductRequest {
                name: name.to_string(),
                price,
                category: category.into(),
            })
            .await?;
        Ok(Product::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self, product), fields(product_id = %product.id()))]
    pub async fn update_product(&self, product: &Product) -> Result<Product> {
        let dto = self
            .command
            .update_product(UpdateProductRequest {
                id: product.id().value(),
                name: product.name().value().to_string(),
                price: product.price().value(),
                category: product.category().into(),
            })
            .await?;
        Ok(Product::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Product> {
        let dto = self.command.delete_product(id.value()).await?;
        Ok(Product::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn category_by_id(&self, id: &CategoryId) -> Result<Category> {
        let dto = self.query.category_by_id(id.value()).await?;
        Ok(Category::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn category_list(&self) -> Result<Vec<Category>> {
        let dtos = self.query.list_categories().await?;
        Ok(dtos
            .iter()
            .map(Category::try_from)
            .collect::<std::result::Result<_, _>>()?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn product_by_id(&self, id: &ProductId) -> Result<Product> {
        let dto = self.query.product_by_id(id.value()).await?;
        Ok(Product::try_from(&dto)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn product_list(&self) -> Result<Vec<Product>> {
        let dtos = self.query.list_products().await?;
        Ok(dtos
            .iter()
            .map(Product::try_from)
            .collect::<std::result::Result<_, _>>()?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn product_by_keyword(&self, keyword: &str) -> Result<Vec<Product>> {
        let dtos = self.query.search_products(keyword.to_string()).await?;
        Ok(dtos
            .iter()
            .map(Product::try_from)
            .collect::<std::result::Result<_, _>>()?)
    }

    /// Opens the product stream and returns a channel fed by a background task.
    ///
    /// The channel yields one `Ok` per product. A stream error arrives as a
    /// single final `Err`; a clean end of stream just closes the channel.
    /// Cancelling `cancel` stops the task, which closes the stream and then
    /// the channel.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn stream_products(&self, cancel: CancellationToken) -> Result<ProductReceiver> {
        let stream = self.query.stream_products().await?;
        let (receiver, _task) = spawn_bridge(stream, cancel);
        Ok(receiver)
    }
}
