use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use domain::{
    Category, CategoryId, CategoryName, CategoryRepository, EntityKind, Outcome, Product,
    ProductId, ProductName, ProductPrice, ProductRepository, StorageError, StorageResult,
    TransactionManager,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::snapshot::CatalogSnapshot;

#[derive(Debug, Clone)]
struct CategoryRow {
    name: CategoryName,
}

#[derive(Debug, Clone)]
struct ProductRow {
    name: ProductName,
    price: ProductPrice,
    category_id: Uuid,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    categories: BTreeMap<Uuid, CategoryRow>,
    products: BTreeMap<Uuid, ProductRow>,
}

impl Tables {
    fn category(&self, id: Uuid) -> StorageResult<Category> {
        let row = self
            .categories
            .get(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Category, id))?;
        Ok(Category::build(CategoryId::from_uuid(id), row.name.clone()))
    }

    fn product(&self, id: Uuid) -> StorageResult<Product> {
        let row = self
            .products
            .get(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Product, id))?;
        let category = self.category(row.category_id)?;
        Ok(Product::build(
            ProductId::from_uuid(id),
            row.name.clone(),
            row.price,
            category,
        ))
    }

    fn category_name_taken(&self, name: &CategoryName, except: Option<Uuid>) -> bool {
        self.categories
            .iter()
            .any(|(id, row)| Some(*id) != except && row.name == *name)
    }

    fn product_name_taken(&self, name: &ProductName, except: Option<Uuid>) -> bool {
        self.products
            .iter()
            .any(|(id, row)| Some(*id) != except && row.name == *name)
    }
}

#[derive(Debug, Default)]
struct Counters {
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    failed: AtomicU64,
    abandoned: AtomicU64,
}

#[derive(Debug, Default)]
struct Faults {
    begin: AtomicBool,
    commit: AtomicBool,
    rollback: AtomicBool,
}

/// Point-in-time transaction counters of an [`InMemoryStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub begun: u64,
    pub committed: u64,
    /// Explicit rollbacks plus handles dropped without completion.
    pub rolled_back: u64,
    /// Commit or rollback attempts that failed.
    pub failed: u64,
    /// Handles dropped without completion.
    pub abandoned: u64,
}

impl TransactionStats {
    /// Number of handles that reached a final state.
    pub fn finalized(&self) -> u64 {
        self.committed + self.rolled_back + self.failed
    }

    /// Number of handles still open.
    pub fn open(&self) -> u64 {
        self.begun.saturating_sub(self.finalized())
    }
}

/// In-memory store implementation for testing and local runs.
///
/// Transactions are serialized: a handle holds the table lock from `begin`
/// until it is completed or dropped, and works on a private copy that is
/// only published on commit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    counters: Arc<Counters>,
    faults: Arc<Faults>,
    next_tx_id: Arc<AtomicU64>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transaction counters.
    pub fn stats(&self) -> TransactionStats {
        TransactionStats {
            begun: self.counters.begun.load(Ordering::SeqCst),
            committed: self.counters.committed.load(Ordering::SeqCst),
            rolled_back: self.counters.rolled_back.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            abandoned: self.counters.abandoned.load(Ordering::SeqCst),
        }
    }

    /// Makes the next `begin` fail as if the database were unreachable.
    pub fn fail_next_begin(&self) {
        self.faults.begin.store(true, Ordering::SeqCst);
    }

    /// Makes the next commit fail; the staged changes are discarded.
    pub fn fail_next_commit(&self) {
        self.faults.commit.store(true, Ordering::SeqCst);
    }

    /// Makes the next rollback report a failure.
    pub fn fail_next_rollback(&self) {
        self.faults.rollback.store(true, Ordering::SeqCst);
    }

    /// Returns the committed contents, waiting for any open transaction.
    pub async fn snapshot(&self) -> StorageResult<CatalogSnapshot> {
        let tables = self.tables.lock().await;
        let categories = tables
            .categories
            .keys()
            .map(|id| tables.category(*id))
            .collect::<StorageResult<Vec<_>>>()?;
        let products = tables
            .products
            .keys()
            .map(|id| tables.product(*id))
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(CatalogSnapshot {
            categories,
            products,
        })
    }
}

struct OpenState {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

/// Handle of an open in-memory transaction.
///
/// Dropping the handle without completing it rolls it back.
pub struct InMemoryTransaction {
    id: u64,
    state: Option<OpenState>,
    counters: Arc<Counters>,
}

impl InMemoryTransaction {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finalized(&self) -> bool {
        self.state.is_none()
    }

    fn tables(&mut self) -> StorageResult<&mut Tables> {
        self.state
            .as_mut()
            .map(|state| &mut state.staged)
            .ok_or(StorageError::TransactionFinalized)
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if self.state.take().is_some() {
            self.counters.rolled_back.fetch_add(1, Ordering::SeqCst);
            self.counters.abandoned.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(tx_id = self.id, "transaction dropped before completion, rolled back");
        }
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> StorageResult<InMemoryTransaction> {
        if self.faults.begin.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "connection refused (injected)".to_string(),
            ));
        }

        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        let id = self.next_tx_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.begun.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(tx_id = id, "transaction started");

        Ok(InMemoryTransaction {
            id,
            state: Some(OpenState { guard, staged }),
            counters: Arc::clone(&self.counters),
        })
    }

    async fn complete(&self, tx: &mut InMemoryTransaction, outcome: Outcome<'_>) -> StorageResult<()> {
        let Some(OpenState { mut guard, staged }) = tx.state.take() else {
            return Err(StorageError::TransactionFinalized);
        };

        match outcome {
            None => {
                if self.faults.commit.swap(false, Ordering::SeqCst) {
                    self.counters.failed.fetch_add(1, Ordering::SeqCst);
                    return Err(StorageError::Unavailable(
                        "commit failed (injected)".to_string(),
                    ));
                }
                *guard = staged;
                self.counters.committed.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(tx_id = tx.id, "transaction committed");
            }
            Some(reason) => {
                if self.faults.rollback.swap(false, Ordering::SeqCst) {
                    self.counters.failed.fetch_add(1, Ordering::SeqCst);
                    return Err(StorageError::Unavailable(
                        "rollback failed (injected)".to_string(),
                    ));
                }
                self.counters.rolled_back.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(tx_id = tx.id, reason = %reason, "transaction rolled back");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn exists_by_name(
        &self,
        tx: &mut InMemoryTransaction,
        name: &CategoryName,
    ) -> StorageResult<bool> {
        Ok(tx.tables()?.category_name_taken(name, None))
    }

    async fn create(&self, tx: &mut InMemoryTransaction, category: &Category) -> StorageResult<()> {
        let tables = tx.tables()?;
        let id = category.id().as_uuid();
        if tables.categories.contains_key(&id) || tables.category_name_taken(category.name(), None)
        {
            return Err(StorageError::Duplicate {
                entity: EntityKind::Category,
                name: category.name().value().to_string(),
            });
        }
        tables.categories.insert(
            id,
            CategoryRow {
                name: category.name().clone(),
            },
        );
        Ok(())
    }

    async fn update_by_id(
        &self,
        tx: &mut InMemoryTransaction,
        category: &Category,
    ) -> StorageResult<()> {
        let tables = tx.tables()?;
        let id = category.id().as_uuid();
        if !tables.categories.contains_key(&id) {
            return Err(StorageError::not_found(EntityKind::Category, category.id()));
        }
        if tables.category_name_taken(category.name(), Some(id)) {
            return Err(StorageError::Duplicate {
                entity: EntityKind::Category,
                name: category.name().value().to_string(),
            });
        }
        tables.categories.insert(
            id,
            CategoryRow {
                name: category.name().clone(),
            },
        );
        Ok(())
    }

    async fn delete_by_id(&self, tx: &mut InMemoryTransaction, id: &CategoryId) -> StorageResult<()> {
        let tables = tx.tables()?;
        let key = id.as_uuid();
        if !tables.categories.contains_key(&key) {
            return Err(StorageError::not_found(EntityKind::Category, id));
        }
        if tables.products.values().any(|row| row.category_id == key) {
            return Err(StorageError::StillReferenced {
                entity: EntityKind::Category,
                id: id.value(),
            });
        }
        tables.categories.remove(&key);
        Ok(())
    }

    async fn find_by_id(
        &self,
        tx: &mut InMemoryTransaction,
        id: &CategoryId,
    ) -> StorageResult<Category> {
        tx.tables()?.category(id.as_uuid())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    type Tx = InMemoryTransaction;

    async fn exists_by_name(
        &self,
        tx: &mut InMemoryTransaction,
        name: &ProductName,
    ) -> StorageResult<bool> {
        Ok(tx.tables()?.product_name_taken(name, None))
    }

    async fn create(&self, tx: &mut InMemoryTransaction, product: &Product) -> StorageResult<()> {
        let tables = tx.tables()?;
        let id = product.id().as_uuid();
        let category_id = product.category().id();
        if !tables.categories.contains_key(&category_id.as_uuid()) {
            return Err(StorageError::not_found(EntityKind::Category, category_id));
        }
        if tables.products.contains_key(&id) || tables.product_name_taken(product.name(), None) {
            return Err(StorageError::Duplicate {
                entity: EntityKind::Product,
                name: product.name().value().to_string(),
            });
        }
        tables.products.insert(
            id,
            ProductRow {
                name: product.name().clone(),
                price: product.price(),
                category_id: category_id.as_uuid(),
            },
        );
        Ok(())
    }

    async fn update_by_id(
        &self,
        tx: &mut InMemoryTransaction,
        product: &Product,
    ) -> StorageResult<()> {
        let tables = tx.tables()?;
        let id = product.id().as_uuid();
        let category_id = product.category().id();
        if !tables.products.contains_key(&id) {
            return Err(StorageError::not_found(EntityKind::Product, product.id()));
        }
        if !tables.categories.contains_key(&category_id.as_uuid()) {
            return Err(StorageError::not_found(EntityKind::Category, category_id));
        }
        if tables.product_name_taken(product.name(), Some(id)) {
            return Err(StorageError::Duplicate {
                entity: EntityKind::Product,
                name: product.name().value().to_string(),
            });
        }
        tables.products.insert(
            id,
            ProductRow {
                name: product.name().clone(),
                price: product.price(),
                category_id: category_id.as_uuid(),
            },
        );
        Ok(())
    }

    async fn delete_by_id(&self, tx: &mut InMemoryTransaction, id: &ProductId) -> StorageResult<()> {
        let tables = tx.tables()?;
        tables
            .products
            .remove(&id.as_uuid())
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(EntityKind::Product, id))
    }

    async fn find_by_id(
        &self,
        tx: &mut InMemoryTransaction,
        id: &ProductId,
    ) -> StorageResult<Product> {
        tx.tables()?.product(id.as_uuid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        Category::new(CategoryName::new(name).unwrap())
    }

    #[test]
    fn open_count_never_underflows_on_a_torn_read() {
        let stats = TransactionStats {
            begun: 1,
            committed: 2,
            ..TransactionStats::default()
        };

        assert_eq!(stats.finalized(), 2);
        assert_eq!(stats.open(), 0);
    }

    fn product(name: &str, price: u32, category: &Category) -> Product {
        Product::new(
            ProductName::new(name).unwrap(),
            ProductPrice::new(price).unwrap(),
            category.clone(),
        )
    }

    async fn seed_category(store: &InMemoryStore, name: &str) -> Category {
        let stationery = category(name);
        let mut tx = store.begin().await.unwrap();
        CategoryRepository::create(store, &mut tx, &stationery)
            .await
            .unwrap();
        store.complete(&mut tx, None).await.unwrap();
        stationery
    }

    #[tokio::test]
    async fn commit_publishes_changes() {
        let store = InMemoryStore::new();
        let stationery = seed_category(&store, "Stationery").await;

        let mut tx = store.begin().await.unwrap();
        let found = CategoryRepository::find_by_id(&store, &mut tx, &stationery.id())
            .await
            .unwrap();
        assert_eq!(found, stationery);
        assert!(
            CategoryRepository::exists_by_name(&store, &mut tx, stationery.name())
                .await
                .unwrap()
        );
        store.complete(&mut tx, None).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.begun, 2);
        assert_eq!(stats.committed, 2);
        assert_eq!(stats.open(), 0);
    }

    #[tokio::test]
    async fn rollback_discards_changes() {
        let store = InMemoryStore::new();
        let stationery = category("Stationery");

        let mut tx = store.begin().await.unwrap();
        CategoryRepository::create(&store, &mut tx, &stationery)
            .await
            .unwrap();
        let reason = StorageError::Unavailable("test".to_string());
        store.complete(&mut tx, Some(&reason)).await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(store.stats().rolled_back, 1);
    }

    #[tokio::test]
    async fn completing_twice_fails_visibly() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        store.complete(&mut tx, None).await.unwrap();

        let second = store.complete(&mut tx, None).await;
        assert!(matches!(second, Err(StorageError::TransactionFinalized)));
        assert!(tx.is_finalized());
        assert_eq!(store.stats().finalized(), 1);
    }

    #[tokio::test]
    async fn operations_on_finalized_handle_fail() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        store.complete(&mut tx, None).await.unwrap();

        let result = CategoryRepository::create(&store, &mut tx, &category("Stationery")).await;
        assert!(matches!(result, Err(StorageError::TransactionFinalized)));
    }

    #[tokio::test]
    async fn dropped_handle_rolls_back() {
        let store = InMemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            CategoryRepository::create(&store, &mut tx, &category("Stationery"))
                .await
                .unwrap();
        }

        let stats = store.stats();
        assert_eq!(stats.abandoned, 1);
        assert_eq!(stats.rolled_back, 1);
        assert_eq!(stats.open(), 0);
        assert!(store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_by_storage() {
        let store = InMemoryStore::new();
        seed_category(&store, "Stationery").await;

        let mut tx = store.begin().await.unwrap();
        let result = CategoryRepository::create(&store, &mut tx, &category("Stationery")).await;
        assert!(matches!(
            result,
            Err(StorageError::Duplicate {
                entity: EntityKind::Category,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let ghost = category("Ghost");
        let result = CategoryRepository::update_by_id(&store, &mut tx, &ghost).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));

        let result = CategoryRepository::delete_by_id(&store, &mut tx, &ghost.id()).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));

        let result = ProductRepository::find_by_id(&store, &mut tx, &ProductId::generate()).await;
        assert!(matches!(
            result,
            Err(StorageError::NotFound {
                entity: EntityKind::Product,
                ..
            })
        ));

        let ghost_pen = product("Pen", 100, &ghost);
        let result = ProductRepository::update_by_id(&store, &mut tx, &ghost_pen).await;
        assert!(matches!(
            result,
            Err(StorageError::NotFound {
                entity: EntityKind::Product,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn product_requires_existing_category() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let orphan = product("Pen", 100, &category("Missing"));
        let result = ProductRepository::create(&store, &mut tx, &orphan).await;
        assert!(matches!(
            result,
            Err(StorageError::NotFound {
                entity: EntityKind::Category,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn product_reads_join_current_category() {
        let store = InMemoryStore::new();
        let stationery = seed_category(&store, "Stationery").await;

        let mut tx = store.begin().await.unwrap();
        let pen = product("Pen", 100, &stationery);
        ProductRepository::create(&store, &mut tx, &pen).await.unwrap();

        let mut renamed = stationery.clone();
        renamed.change_name(CategoryName::new("Office").unwrap());
        CategoryRepository::update_by_id(&store, &mut tx, &renamed)
            .await
            .unwrap();

        let found = ProductRepository::find_by_id(&store, &mut tx, &pen.id())
            .await
            .unwrap();
        assert_eq!(found.category().name().value(), "Office");
        store.complete(&mut tx, None).await.unwrap();
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let stationery = seed_category(&store, "Stationery").await;

        let mut tx = store.begin().await.unwrap();
        ProductRepository::create(&store, &mut tx, &product("Pen", 100, &stationery))
            .await
            .unwrap();
        let result = CategoryRepository::delete_by_id(&store, &mut tx, &stationery.id()).await;
        assert!(matches!(result, Err(StorageError::StillReferenced { .. })));
    }

    #[tokio::test]
    async fn injected_begin_failure_is_unavailable() {
        let store = InMemoryStore::new();
        store.fail_next_begin();

        assert!(matches!(
            store.begin().await,
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(store.stats().begun, 0);
        assert!(store.begin().await.is_ok());
    }

    #[tokio::test]
    async fn injected_commit_failure_discards_changes() {
        let store = InMemoryStore::new();
        store.fail_next_commit();

        let mut tx = store.begin().await.unwrap();
        CategoryRepository::create(&store, &mut tx, &category("Stationery"))
            .await
            .unwrap();
        let result = store.complete(&mut tx, None).await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert!(store.snapshot().await.unwrap().is_empty());
        assert_eq!(store.stats().failed, 1);
        assert_eq!(store.stats().open(), 0);
    }

    #[tokio::test]
    async fn snapshot_contains_joined_products() {
        let store = InMemoryStore::new();
        let stationery = seed_category(&store, "Stationery").await;

        let mut tx = store.begin().await.unwrap();
        ProductRepository::create(&store, &mut tx, &product("Pen", 100, &stationery))
            .await
            .unwrap();
        store.complete(&mut tx, None).await.unwrap();

        let snapshot = store.snapshot().await.unwrap();
        assert_eq!(snapshot.categories.len(), 1);
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.products[0].category(), &stationery);
    }
}
