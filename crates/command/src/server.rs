//! Command backend served by the application services.

use async_trait::async_trait;
use common::{
    CategoryDto, CommandBackend, CreateCategoryRequest, CreateProductRequest, ProductDto,
    RpcResult, Status, UpdateCategoryRequest, UpdateProductRequest,
};
use domain::{CategoryRepository, ProductRepository, TransactionManager};

use crate::category_service::CategoryService;
use crate::commands::{DeleteCategory, DeleteProduct};
use crate::product_service::ProductService;

/// In-process [`CommandBackend`] over a category and a product service.
pub struct CommandServer<M, C, P>
where
    M: TransactionManager,
    C: CategoryRepository<Tx = M::Tx>,
    P: ProductRepository<Tx = M::Tx>,
{
    categories: CategoryService<M, C>,
    products: ProductService<M, P>,
}

impl<M, C, P> CommandServer<M, C, P>
where
    M: TransactionManager,
    C: CategoryRepository<Tx = M::Tx>,
    P: ProductRepository<Tx = M::Tx>,
{
    pub fn new(categories: CategoryService<M, C>, products: ProductService<M, P>) -> Self {
        Self {
            categories,
            products,
        }
    }

    pub fn categories(&self) -> &CategoryService<M, C> {
        &self.categories
    }

    pub fn products(&self) -> &ProductService<M, P> {
        &self.products
    }
}

impl<S> CommandServer<S, S, S>
where
    S: TransactionManager
        + CategoryRepository<Tx = <S as TransactionManager>::Tx>
        + ProductRepository<Tx = <S as TransactionManager>::Tx>
        + Clone,
{
    /// Builds both services over one store that implements every port.
    pub fn from_store(store: S) -> Self {
        Self::new(
            CategoryService::new(store.clone(), store.clone()),
            ProductService::new(store.clone(), store),
        )
    }
}

#[async_trait]
impl<M, C, P> CommandBackend for CommandServer<M, C, P>
where
    M: TransactionManager,
    C: CategoryRepository<Tx = M::Tx>,
    P: ProductRepository<Tx = M::Tx>,
{
    async fn create_category(&self, request: CreateCategoryRequest) -> RpcResult<CategoryDto> {
        self.categories
            .add(request.into())
            .await
            .map_err(Status::from)
    }

    async fn update_category(&self, request: UpdateCategoryRequest) -> RpcResult<CategoryDto> {
        self.categories
            .update(request.into())
            .await
            .map_err(Status::from)
    }

    async fn delete_category(&self, id: String) -> RpcResult<CategoryDto> {
        self.categories
            .delete(DeleteCategory::new(id))
            .await
            .map_err(Status::from)
    }

    async fn create_product(&self, request: CreateProductRequest) -> RpcResult<ProductDto> {
        self.products
            .add(request.into())
            .await
            .map_err(Status::from)
    }

    async fn update_product(&self, request: UpdateProductRequest) -> RpcResult<ProductDto> {
        self.products
            .update(request.into())
            .await
            .map_err(Status::from)
    }

    async fn delete_product(&self, id: String) -> RpcResult<ProductDto> {
        self.products
            .delete(DeleteProduct::new(id))
            .await
            .map_err(Status::from)
    }
}
