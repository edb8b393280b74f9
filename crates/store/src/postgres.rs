use async_trait::async_trait;
use domain::{
    Category, CategoryId, CategoryName, CategoryRepository, EntityKind, Outcome, Product,
    ProductId, ProductName, ProductPrice, ProductRepository, StorageError, StorageResult,
    TransactionManager,
};
use sqlx::{PgConnection, PgPool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{database, is_foreign_key_violation, is_unique_violation};

pub const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.name, p.price, c.id AS category_id, c.name AS category_name
    FROM products p
    JOIN categories c ON c.id = p.category_id
"#;

/// PostgreSQL-backed store for the command side.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

/// Maps a joined product row (see `SELECT_PRODUCT`).
pub fn row_to_product(row: &PgRow) -> StorageResult<Product> {
    let category = Category::build(
        CategoryId::from_uuid(row.try_get::<Uuid, _>("category_id").map_err(database)?),
        CategoryName::new(row.try_get::<String, _>("category_name").map_err(database)?)?,
    );
    Ok(Product::build(
        ProductId::from_uuid(row.try_get::<Uuid, _>("id").map_err(database)?),
        ProductName::new(row.try_get::<String, _>("name").map_err(database)?)?,
        ProductPrice::from_stored(row.try_get::<i32, _>("price").map_err(database)?)?,
        category,
    ))
}

/// Maps a `categories` row.
pub fn row_to_category(row: &PgRow) -> StorageResult<Category> {
    Ok(Category::build(
        CategoryId::from_uuid(row.try_get::<Uuid, _>("id").map_err(database)?),
        CategoryName::new(row.try_get::<String, _>("name").map_err(database)?)?,
    ))
}

/// Handle of an open PostgreSQL transaction.
///
/// Dropping the handle without completing it returns the connection to the
/// pool, which rolls the transaction back.
pub struct PgTransaction {
    inner: Option<sqlx::Transaction<'static, Postgres>>,
}

impl PgTransaction {
    pub fn is_finalized(&self) -> bool {
        self.inner.is_none()
    }

    fn conn(&mut self) -> StorageResult<&mut PgConnection> {
        match self.inner.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(StorageError::TransactionFinalized),
        }
    }
}

#[async_trait]
impl TransactionManager for PostgresStore {
    type Tx = PgTransaction;

    async fn begin(&self) -> StorageResult<PgTransaction> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(PgTransaction { inner: Some(tx) })
    }

    async fn complete(&self, tx: &mut PgTransaction, outcome: Outcome<'_>) -> StorageResult<()> {
        let inner = tx.inner.take().ok_or(StorageError::TransactionFinalized)?;
        match outcome {
            None => inner.commit().await.map_err(database),
            Some(reason) => {
                tracing::debug!(reason = %reason, "rolling back transaction");
                inner.rollback().await.map_err(database)
            }
        }
    }
}

#[async_trait]
impl CategoryRepository for PostgresStore {
    type Tx = PgTransaction;

    async fn exists_by_name(&self, tx: &mut PgTransaction, name: &CategoryName) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
            .bind(name.value())
            .fetch_one(tx.conn()?)
            .await
            .map_err(database)
    }

    async fn create(&self, tx: &mut PgTransaction, category: &Category) -> StorageResult<()> {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(category.id().as_uuid())
            .bind(category.name().value())
            .execute(tx.conn()?)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return StorageError::Duplicate {
                        entity: EntityKind::Category,
                        name: category.name().value().to_string(),
                    };
                }
                database(e)
            })?;
        Ok(())
    }

    async fn update_by_id(&self, tx: &mut PgTransaction, category: &Category) -> StorageResult<()> {
        let result = sqlx::query("UPDATE categories SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(category.id().as_uuid())
            .bind(category.name().value())
            .execute(tx.conn()?)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return StorageError::Duplicate {
                        entity: EntityKind::Category,
                        name: category.name().value().to_string(),
                    };
                }
                database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(EntityKind::Category, category.id()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, tx: &mut PgTransaction, id: &CategoryId) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(tx.conn()?)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return StorageError::StillReferenced {
                        entity: EntityKind::Category,
                        id: id.value(),
                    };
                }
                database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(EntityKind::Category, id));
        }
        Ok(())
    }

    async fn find_by_id(&self, tx: &mut PgTransaction, id: &CategoryId) -> StorageResult<Category> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(tx.conn()?)
            .await
            .map_err(database)?;

        match row {
            Some(row) => row_to_category(&row),
            None => Err(StorageError::not_found(EntityKind::Category, id)),
        }
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    type Tx = PgTransaction;

    async fn exists_by_name(&self, tx: &mut PgTransaction, name: &ProductName) -> StorageResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE name = $1)")
            .bind(name.value())
            .fetch_one(tx.conn()?)
            .await
            .map_err(database)
    }

    async fn create(&self, tx: &mut PgTransaction, product: &Product) -> StorageResult<()> {
        let category_id = product.category().id();
        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, category_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.name().value())
        .bind(product.price().value() as i32)
        .bind(category_id.as_uuid())
        .execute(tx.conn()?)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return StorageError::Duplicate {
                    entity: EntityKind::Product,
                    name: product.name().value().to_string(),
                };
            }
            if is_foreign_key_violation(&e) {
                return StorageError::not_found(EntityKind::Category, category_id);
            }
            database(e)
        })?;
        Ok(())
    }

    async fn update_by_id(&self, tx: &mut PgTransaction, product: &Product) -> StorageResult<()> {
        let category_id = product.category().id();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, price = $3, category_id = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.name().value())
        .bind(product.price().value() as i32)
        .bind(category_id.as_uuid())
        .execute(tx.conn()?)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return StorageError::Duplicate {
                    entity: EntityKind::Product,
                    name: product.name().value().to_string(),
                };
            }
            if is_foreign_key_violation(&e) {
                return StorageError::not_found(EntityKind::Category, category_id);
            }
            database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(EntityKind::Product, product.id()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, tx: &mut PgTransaction, id: &ProductId) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(tx.conn()?)
            .await
            .map_err(database)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(EntityKind::Product, id));
        }
        Ok(())
    }

    async fn find_by_id(&self, tx: &mut PgTransaction, id: &ProductId) -> StorageResult<Product> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(tx.conn()?)
            .await
            .map_err(database)?;

        match row {
            Some(row) => row_to_product(&row),
            None => Err(StorageError::not_found(EntityKind::Product, id)),
        }
    }
}
