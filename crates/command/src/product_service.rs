//! Product application service.

use common::ProductDto;
use domain::{
    Category, EntityKind, Product, ProductId, ProductName, ProductPrice, ProductRepository,
    TransactionManager,
};

use crate::commands::{AddProduct, DeleteProduct, UpdateProduct};
use crate::error::{Result, ServiceError};
use crate::transaction::{finalize, observed};

/// Runs product commands, each inside exactly one storage transaction.
///
/// Returned products carry the category as stored, which may differ in name
/// from the one the caller sent.
pub struct ProductService<M, R>
where
    M: TransactionManager,
    R: ProductRepository<Tx = M::Tx>,
{
    transactions: M,
    products: R,
}

impl<M, R> ProductService<M, R>
where
    M: TransactionManager,
    R: ProductRepository<Tx = M::Tx>,
{
    /// Creates a new product service.
    pub fn new(transactions: M, products: R) -> Self {
        Self {
            transactions,
            products,
        }
    }

    /// Creates a product with a generated id.
    ///
    /// Fails with `AlreadyExists` when the name is taken and with a category
    /// `NotFound` when the referenced category does not exist.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn add(&self, cmd: AddProduct) -> Result<ProductDto> {
        observed("add_product", self.add_product(cmd)).await
    }

    /// Replaces name, price and category of an existing product.
    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.id))]
    pub async fn update(&self, cmd: UpdateProduct) -> Result<ProductDto> {
        observed("update_product", self.update_product(cmd)).await
    }

    /// Deletes a product and returns its last state.
    #[tracing::instrument(skip(self, cmd), fields(product_id = %cmd.id))]
    pub async fn delete(&self, cmd: DeleteProduct) -> Result<ProductDto> {
        observed("delete_product", self.delete_product(cmd)).await
    }

    /// Reads a product through the write store.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<ProductDto> {
        let id = ProductId::parse(id)?;
        let mut tx = self.transactions.begin().await?;
        let outcome = self
            .products
            .find_by_id(&mut tx, &id)
            .await
            .map_err(ServiceError::from);
        let product = finalize(&self.transactions, &mut tx, outcome).await?;
        Ok(ProductDto::from(&product))
    }

    async fn add_product(&self, cmd: AddProduct) -> Result<ProductDto> {
        let name = ProductName::new(cmd.name)?;
        let price = ProductPrice::new(cmd.price)?;
        let category = Category::try_from(&cmd.category)?;
        let product = Product::new(name, price, category);

        let mut tx = self.transactions.begin().await?;
        let outcome = self.insert(&mut tx, &product).await;
        let stored = finalize(&self.transactions, &mut tx, outcome).await?;

        tracing::info!(
            product_id = %stored.id(),
            category_id = %stored.category().id(),
            "product created"
        );
        Ok(ProductDto::from(&stored))
    }

    async fn insert(&self, tx: &mut M::Tx, product: &Product) -> Result<Product> {
        if self.products.exists_by_name(tx, product.name()).await? {
            return Err(ServiceError::AlreadyExists {
                entity: EntityKind::Product,
                name: product.name().value().to_string(),
            });
        }
        self.products.create(tx, product).await?;
        Ok(self.products.find_by_id(tx, &product.id()).await?)
    }

    async fn update_product(&self, cmd: UpdateProduct) -> Result<ProductDto> {
        let id = ProductId::parse(&cmd.id)?;
        let name = ProductName::new(cmd.name)?;
        let price = ProductPrice::new(cmd.price)?;
        let category = Category::try_from(&cmd.category)?;

        let mut tx = self.transactions.begin().await?;
        let outcome = self.replace(&mut tx, id, name, price, category).await;
        let stored = finalize(&self.transactions, &mut tx, outcome).await?;

        tracing::info!(product_id = %stored.id(), "product updated");
        Ok(ProductDto::from(&stored))
    }

    async fn replace(
        &self,
        tx: &mut M::Tx,
        id: ProductId,
        name: ProductName,
        price: ProductPrice,
        category: Category,
    ) -> Result<Product> {
        let mut product = self.products.find_by_id(tx, &id).await?;
        if product.name() != &name && self.products.exists_by_name(tx, &name).await? {
            return Err(ServiceError::AlreadyExists {
                entity: EntityKind::Product,
                name: name.value().to_string(),
            });
        }
        product.change_name(name);
        product.change_price(price);
        product.change_category(category);
        self.products.update_by_id(tx, &product).await?;
        Ok(self.products.find_by_id(tx, &id).await?)
    }

    async fn delete_product(&self, cmd: DeleteProduct) -> Result<ProductDto> {
        let id = ProductId::parse(&cmd.id)?;

        let mut tx = self.transactions.begin().await?;
        let outcome = self.remove(&mut tx, id).await;
        let product = finalize(&self.transactions, &mut tx, outcome).await?;

        tracing::info!(product_id = %product.id(), "product deleted");
        Ok(ProductDto::from(&product))
    }

    async fn remove(&self, tx: &mut M::Tx, id: ProductId) -> Result<Product> {
        let product = self.products.find_by_id(tx, &id).await?;
        self.products.delete_by_id(tx, &id).await?;
        Ok(product)
    }
}
