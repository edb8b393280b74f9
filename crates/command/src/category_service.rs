//! Category application service.

use common::CategoryDto;
use domain::{
    Category, CategoryId, CategoryName, CategoryRepository, EntityKind, TransactionManager,
};

use crate::commands::{AddCategory, DeleteCategory, UpdateCategory};
use crate::error::{Result, ServiceError};
use crate::transaction::{finalize, observed};

/// Runs category commands, each inside exactly one storage transaction.
pub struct CategoryService<M, R>
where
    M: TransactionManager,
    R: CategoryRepository<Tx = M::Tx>,
{
    transactions: M,
    categories: R,
}

impl<M, R> CategoryService<M, R>
where
    M: TransactionManager,
    R: CategoryRepository<Tx = M::Tx>,
{
    /// Creates a new category service.
    pub fn new(transactions: M, categories: R) -> Self {
        Self {
            transactions,
            categories,
        }
    }

    /// Creates a category with a generated id.
    ///
    /// Fails with `AlreadyExists` when the name is taken.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn add(&self, cmd: AddCategory) -> Result<CategoryDto> {
        observed("add_category", self.add_category(cmd)).await
    }

    /// Renames an existing category.
    #[tracing::instrument(skip(self, cmd), fields(category_id = %cmd.id))]
    pub async fn update(&self, cmd: UpdateCategory) -> Result<CategoryDto> {
        observed("update_category", self.update_category(cmd)).await
    }

    /// Deletes a category and returns its last state.
    #[tracing::instrument(skip(self, cmd), fields(category_id = %cmd.id))]
    pub async fn delete(&self, cmd: DeleteCategory) -> Result<CategoryDto> {
        observed("delete_category", self.delete_category(cmd)).await
    }

    /// Reads a category through the write store.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<CategoryDto> {
        let id = CategoryId::parse(id)?;
        let mut tx = self.transactions.begin().await?;
        let outcome = self
            .categories
            .find_by_id(&mut tx, &id)
            .await
            .map_err(ServiceError::from);
        let category = finalize(&self.transactions, &mut tx, outcome).await?;
        Ok(CategoryDto::from(&category))
    }

    async fn add_category(&self, cmd: AddCategory) -> Result<CategoryDto> {
        let category = Category::new(CategoryName::new(cmd.name)?);

        let mut tx = self.transactions.begin().await?;
        let outcome = self.insert(&mut tx, &category).await;
        finalize(&self.transactions, &mut tx, outcome).await?;

        tracing::info!(category_id = %category.id(), "category created");
        Ok(CategoryDto::from(&category))
    }

    async fn insert(&self, tx: &mut M::Tx, category: &Category) -> Result<()> {
        if self.categories.exists_by_name(tx, category.name()).await? {
            return Err(ServiceError::AlreadyExists {
                entity: EntityKind::Category,
                name: category.name().value().to_string(),
            });
        }
        self.categories.create(tx, category).await?;
        Ok(())
    }

    async fn update_category(&self, cmd: UpdateCategory) -> Result<CategoryDto> {
        let id = CategoryId::parse(&cmd.id)?;
        let name = CategoryName::new(cmd.name)?;

        let mut tx = self.transactions.begin().await?;
        let outcome = self.rename(&mut tx, id, name).await;
        let category = finalize(&self.transactions, &mut tx, outcome).await?;

        tracing::info!(category_id = %category.id(), "category updated");
        Ok(CategoryDto::from(&category))
    }

    async fn rename(&self, tx: &mut M::Tx, id: CategoryId, name: CategoryName) -> Result<Category> {
        let mut category = self.categories.find_by_id(tx, &id).await?;
        if category.name() != &name && self.categories.exists_by_name(tx, &name).await? {
            return Err(ServiceError::AlreadyExists {
                entity: EntityKind::Category,
                name: name.value().to_string(),
            });
        }
        category.change_name(name);
        self.categories.update_by_id(tx, &category).await?;
        Ok(category)
    }

    async fn delete_category(&self, cmd: DeleteCategory) -> Result<CategoryDto> {
        let id = CategoryId::parse(&cmd.id)?;

        let mut tx = self.transactions.begin().await?;
        let outcome = self.remove(&mut tx, id).await;
        let category = finalize(&self.transactions, &mut tx, outcome).await?;

        tracing::info!(category_id = %category.id(), "category deleted");
        Ok(CategoryDto::from(&category))
    }

    async fn remove(&self, tx: &mut M::Tx, id: CategoryId) -> Result<Category> {
        let category = self.categories.find_by_id(tx, &id).await?;
        self.categories.delete_by_id(tx, &id).await?;
        Ok(category)
    }
}
