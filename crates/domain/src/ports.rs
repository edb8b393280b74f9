//! Storage ports consumed by the application services.
//!
//! Adapters implement [`TransactionManager`] together with the repository
//! traits, using the same handle type for both.

use async_trait::async_trait;

use crate::category::Category;
use crate::error::StorageResult;
use crate::product::Product;
use crate::value_objects::{CategoryId, CategoryName, ProductId, ProductName};

/// Outcome handed to [`TransactionManager::complete`]: `None` commits, an
/// error rolls back.
pub type Outcome<'a> = Option<&'a (dyn std::error::Error + Send + Sync + 'static)>;

/// Opens and finalizes units of work.
///
/// Each handle returned by `begin` must be finalized exactly once. A second
/// `complete` on the same handle fails with
/// [`StorageError::TransactionFinalized`](crate::StorageError::TransactionFinalized),
/// and dropping a handle that was never completed rolls it back.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    type Tx: Send;

    /// Opens a new transaction.
    async fn begin(&self) -> StorageResult<Self::Tx>;

    /// Commits the handle when `outcome` is `None`, otherwise rolls it back.
    ///
    /// The returned error describes only a failed commit or rollback.
    async fn complete(&self, tx: &mut Self::Tx, outcome: Outcome<'_>) -> StorageResult<()>;
}

/// Category persistence.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    type Tx: Send;

    async fn exists_by_name(&self, tx: &mut Self::Tx, name: &CategoryName) -> StorageResult<bool>;

    async fn create(&self, tx: &mut Self::Tx, category: &Category) -> StorageResult<()>;

    /// Fails with `NotFound` if no category has this id.
    async fn update_by_id(&self, tx: &mut Self::Tx, category: &Category) -> StorageResult<()>;

    /// Fails with `NotFound` if no category has this id.
    async fn delete_by_id(&self, tx: &mut Self::Tx, id: &CategoryId) -> StorageResult<()>;

    /// Fails with `NotFound` if no category has this id.
    async fn find_by_id(&self, tx: &mut Self::Tx, id: &CategoryId) -> StorageResult<Category>;
}

/// Product persistence. Reads always join the product's category.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    type Tx: Send;

    async fn exists_by_name(&self, tx: &mut Self::Tx, name: &ProductName) -> StorageResult<bool>;

    /// Fails with `NotFound(category)` if the product's category is missing.
    async fn create(&self, tx: &mut Self::Tx, product: &Product) -> StorageResult<()>;

    /// Fails with `NotFound` if no product has this id.
    async fn update_by_id(&self, tx: &mut Self::Tx, product: &Product) -> StorageResult<()>;

    /// Fails with `NotFound` if no product has this id.
    async fn delete_by_id(&self, tx: &mut Self::Tx, id: &ProductId) -> StorageResult<()>;

    /// Fails with `NotFound` if no product has this id.
    async fn find_by_id(&self, tx: &mut Self::Tx, id: &ProductId) -> StorageResult<Product>;
}
