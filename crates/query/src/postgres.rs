//! PostgreSQL read model over a (physically replicated) catalog database.

use async_trait::async_trait;
use domain::{Category, CategoryId, Product, ProductId};
use futures_util::{TryStreamExt, stream};
use sqlx::PgPool;
use store::error::database;
use store::postgres::{SELECT_PRODUCT, row_to_category, row_to_product};
use uuid::Uuid;

use crate::{QueryError, Result};
use crate::read_model::{ProductRows, ReadModel};

/// Rows fetched per round trip by [`PostgresReadModel::stream_products`].
const STREAM_PAGE_SIZE: i64 = 100;

/// Read model backed by a PostgreSQL replica.
#[derive(Clone)]
pub struct PostgresReadModel {
    pool: PgPool,
}

impl PostgresReadModel {
    /// Creates a new read model over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Escapes `LIKE` wildcards so the keyword matches literally.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// `ORDER BY` terms for a case-insensitive name order that does not depend
/// on the database collation.
fn name_order(column: &str) -> String {
    format!("lower({column}) COLLATE \"C\", {column} COLLATE \"C\"")
}

async fn fetch_page(pool: &PgPool, after: Option<Uuid>) -> Result<Vec<Product>> {
    let sql = format!(
        "{SELECT_PRODUCT} WHERE ($1::uuid IS NULL OR p.id > $1) ORDER BY p.id LIMIT $2"
    );
    let rows = sqlx::query(&sql)
        .bind(after)
        .bind(STREAM_PAGE_SIZE)
        .fetch_all(pool)
        .await
        .map_err(database)?;

    Ok(rows
        .iter()
        .map(row_to_product)
        .collect::<domain::StorageResult<Vec<_>>>()?)
}

#[async_trait]
impl ReadModel for PostgresReadModel {
    fn name(&self) -> &'static str {
        "PostgresReadModel"
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let sql = format!("SELECT id, name FROM categories ORDER BY {}", name_order("name"));
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(database)?;

        Ok(rows
            .iter()
            .map(row_to_category)
            .collect::<domain::StorageResult<Vec<_>>>()?)
    }

    async fn category(&self, id: &CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(database)?;

        Ok(row.as_ref().map(row_to_category).transpose()?)
    }

    async fn products(&self) -> Result<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY {}", name_order("p.name"));
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(database)?;

        Ok(rows
            .iter()
            .map(row_to_product)
            .collect::<domain::StorageResult<Vec<_>>>()?)
    }

    async fn product(&self, id: &ProductId) -> Result<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(database)?;

        Ok(row.as_ref().map(row_to_product).transpose()?)
    }

    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>> {
        let sql = format!(
            "{SELECT_PRODUCT} WHERE p.name ILIKE $1 ESCAPE '\\' ORDER BY {}",
            name_order("p.name")
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await
            .map_err(database)?;

        Ok(rows
            .iter()
            .map(row_to_product)
            .collect::<domain::StorageResult<Vec<_>>>()?)
    }

    /// Pages through products by id so no single query holds the whole table.
    async fn stream_products(&self) -> Result<ProductRows> {
        let start = PageCursor {
            pool: self.pool.clone(),
            after: None,
            exhausted: false,
        };
        let rows = stream::try_unfold(start, next_page)
            .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, QueryError>)))
            .try_flatten();
        Ok(Box::pin(rows))
    }
}

struct PageCursor {
    pool: PgPool,
    after: Option<Uuid>,
    exhausted: bool,
}

async fn next_page(cursor: PageCursor) -> Result<Option<(Vec<Product>, PageCursor)>> {
    if cursor.exhausted {
        return Ok(None);
    }
    let page = fetch_page(&cursor.pool, cursor.after).await?;
    let next = PageCursor {
        after: page.last().map(|product| product.id().as_uuid()),
        exhausted: (page.len() as i64) < STREAM_PAGE_SIZE,
        pool: cursor.pool,
    };
    Ok(Some((page, next)))
}
