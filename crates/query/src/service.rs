//! Query backend served from a read model.

use async_trait::async_trait;
use common::{
    BoxedServerStream, CategoryDto, ProductDto, ProductStream, QueryBackend, RpcResult, Status,
};
use domain::{CategoryId, EntityKind, ProductId};
use futures_util::StreamExt;

use crate::read_model::ReadModel;
use crate::{QueryError, Result};

/// In-process [`QueryBackend`] over any [`ReadModel`].
pub struct QueryService<R: ReadModel> {
    read_model: R,
}

impl<R: ReadModel> QueryService<R> {
    /// Creates a new query service.
    pub fn new(read_model: R) -> Self {
        Self { read_model }
    }

    pub fn read_model(&self) -> &R {
        &self.read_model
    }

    async fn category(&self, id: &str) -> Result<CategoryDto> {
        let category_id = CategoryId::parse(id)?;
        self.read_model
            .category(&category_id)
            .await?
            .map(|category| CategoryDto::from(&category))
            .ok_or_else(|| QueryError::not_found(EntityKind::Category, id))
    }

    async fn product(&self, id: &str) -> Result<ProductDto> {
        let product_id = ProductId::parse(id)?;
        self.read_model
            .product(&product_id)
            .await?
            .map(|product| ProductDto::from(&product))
            .ok_or_else(|| QueryError::not_found(EntityKind::Product, id))
    }
}

fn record(operation: &'static str) {
    metrics::counter!("query_requests_total", "operation" => operation).increment(1);
}

#[async_trait]
impl<R: ReadModel> QueryBackend for QueryService<R> {
    #[tracing::instrument(skip(self))]
    async fn list_categories(&self) -> RpcResult<Vec<CategoryDto>> {
        record("list_categories");
        let categories = self.read_model.categories().await.map_err(Status::from)?;
        Ok(categories.iter().map(CategoryDto::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn category_by_id(&self, id: String) -> RpcResult<CategoryDto> {
        record("category_by_id");
        self.category(&id).await.map_err(Status::from)
    }

    #[tracing::instrument(skip(self))]
    async fn list_products(&self) -> RpcResult<Vec<ProductDto>> {
        record("list_products");
        let products = self.read_model.products().await.map_err(Status::from)?;
        Ok(products.iter().map(ProductDto::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn product_by_id(&self, id: String) -> RpcResult<ProductDto> {
        record("product_by_id");
        self.product(&id).await.map_err(Status::from)
    }

    #[tracing::instrument(skip(self))]
    async fn search_products(&self, keyword: String) -> RpcResult<Vec<ProductDto>> {
        record("search_products");
        let products = self
            .read_model
            .search_products(&keyword)
            .await
            .map_err(Status::from)?;
        Ok(products.iter().map(ProductDto::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn stream_products(&self) -> RpcResult<ProductStream> {
        record("stream_products");
        let rows = self
            .read_model
            .stream_products()
            .await
            .map_err(Status::from)?;
        let messages = rows.map(|row| {
            row.map(|product| ProductDto::from(&product))
                .map_err(Status::from)
        });
        Ok(Box::new(BoxedServerStream::new(messages)))
    }
}
