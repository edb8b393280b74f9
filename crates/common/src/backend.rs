//! Command and Query backend contracts.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::status::Status;
use crate::types::{
    CategoryDto, CreateCategoryRequest, CreateProductRequest, ProductDto, UpdateCategoryRequest,
    UpdateProductRequest,
};

/// Result of a unary backend call.
pub type RpcResult<T> = std::result::Result<T, Status>;

/// The receiving half of a server-streamed call.
///
/// Implementations are owned by a single task; `receive` and `close` are never
/// called concurrently.
#[async_trait]
pub trait ServerStream<T: Send>: Send {
    /// Receives the next message.
    ///
    /// Returns `None` once the server has ended the stream cleanly.
    async fn receive(&mut self) -> Option<RpcResult<T>>;

    /// Releases the underlying call. Calling `receive` afterwards yields `None`.
    async fn close(&mut self) -> RpcResult<()>;
}

/// Server stream of products.
pub type ProductStream = Box<dyn ServerStream<ProductDto>>;

/// Write side of the catalog. Every call mutates the primary store.
#[async_trait]
pub trait CommandBackend: Send + Sync {
    async fn create_category(&self, request: CreateCategoryRequest) -> RpcResult<CategoryDto>;

    async fn update_category(&self, request: UpdateCategoryRequest) -> RpcResult<CategoryDto>;

    async fn delete_category(&self, id: String) -> RpcResult<CategoryDto>;

    async fn create_product(&self, request: CreateProductRequest) -> RpcResult<ProductDto>;

    async fn update_product(&self, request: UpdateProductRequest) -> RpcResult<ProductDto>;

    async fn delete_product(&self, id: String) -> RpcResult<ProductDto>;
}

/// Read side of the catalog, served from a replica that may lag behind the
/// command side.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn list_categories(&self) -> RpcResult<Vec<CategoryDto>>;

    async fn category_by_id(&self, id: String) -> RpcResult<CategoryDto>;

    async fn list_products(&self) -> RpcResult<Vec<ProductDto>>;

    async fn product_by_id(&self, id: String) -> RpcResult<ProductDto>;

    async fn search_products(&self, keyword: String) -> RpcResult<Vec<ProductDto>>;

    async fn stream_products(&self) -> RpcResult<ProductStream>;
}

#[async_trait]
impl<T: CommandBackend + ?Sized> CommandBackend for Arc<T> {
    async fn create_category(&self, request: CreateCategoryRequest) -> RpcResult<CategoryDto> {
        (**self).create_category(request).await
    }

    async fn update_category(&self, request: UpdateCategoryRequest) -> RpcResult<CategoryDto> {
        (**self).update_category(request).await
    }

    async fn delete_category(&self, id: String) -> RpcResult<CategoryDto> {
        (**self).delete_category(id).await
    }

    async fn create_product(&self, request: CreateProductRequest) -> RpcResult<ProductDto> {
        (**self).create_product(request).await
    }

    async fn update_product(&self, request: UpdateProductRequest) -> RpcResult<ProductDto> {
        (**self).update_product(request).await
    }

    async fn delete_product(&self, id: String) -> RpcResult<ProductDto> {
        (**self).delete_product(id).await
    }
}

#[async_trait]
impl<T: QueryBackend + ?Sized> QueryBackend for Arc<T> {
    async fn list_categories(&self) -> RpcResult<Vec<CategoryDto>> {
        (**self).list_categories().await
    }

    async fn category_by_id(&self, id: String) -> RpcResult<CategoryDto> {
        (**self).category_by_id(id).await
    }

    async fn list_products(&self) -> RpcResult<Vec<ProductDto>> {
        (**self).list_products().await
    }

    async fn product_by_id(&self, id: String) -> RpcResult<ProductDto> {
        (**self).product_by_id(id).await
    }

    async fn search_products(&self, keyword: String) -> RpcResult<Vec<ProductDto>> {
        (**self).search_products(keyword).await
    }

    async fn stream_products(&self) -> RpcResult<ProductStream> {
        (**self).stream_products().await
    }
}

/// [`ServerStream`] over an in-process `futures` stream.
pub struct BoxedServerStream<T> {
    inner: Option<Pin<Box<dyn Stream<Item = RpcResult<T>> + Send>>>,
}

impl<T> BoxedServerStream<T> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = RpcResult<T>> + Send + 'static,
    {
        Self {
            inner: Some(Box::pin(stream)),
        }
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

#[async_trait]
impl<T: Send + 'static> ServerStream<T> for BoxedServerStream<T> {
    async fn receive(&mut self) -> Option<RpcResult<T>> {
        match self.inner.as_mut() {
            Some(stream) => stream.next().await,
            None => None,
        }
    }

    async fn close(&mut self) -> RpcResult<()> {
        self.inner = None;
        Ok(())
    }
}
