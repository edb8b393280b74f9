//! Replication from the primary store into a [`ReplicaStore`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::StorageResult;
use store::{CatalogSnapshot, InMemoryStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::replica::ReplicaStore;

/// Source of committed catalog snapshots.
#[async_trait]
pub trait ReplicationSource: Send + Sync {
    async fn snapshot(&self) -> StorageResult<CatalogSnapshot>;
}

#[async_trait]
impl ReplicationSource for InMemoryStore {
    async fn snapshot(&self) -> StorageResult<CatalogSnapshot> {
        InMemoryStore::snapshot(self).await
    }
}

/// Summary of one replication pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationReport {
    pub categories: usize,
    pub products: usize,
    pub synced_at: DateTime<Utc>,
}

/// Copies committed snapshots of a source into a replica.
///
/// Between passes the replica lags behind the source; this is the
/// eventual consistency the query side exposes.
pub struct Replicator<S: ReplicationSource> {
    source: S,
    replica: ReplicaStore,
}

impl<S: ReplicationSource + 'static> Replicator<S> {
    /// Creates a new replicator feeding `replica` from `source`.
    pub fn new(source: S, replica: ReplicaStore) -> Self {
        Self { source, replica }
    }

    /// Runs a single replication pass.
    #[tracing::instrument(skip(self))]
    pub async fn sync_once(&self) -> Result<ReplicationReport> {
        let snapshot = self.source.snapshot().await?;
        let categories = snapshot.categories.len();
        let products = snapshot.products.len();
        let synced_at = self.replica.apply(snapshot).await;

        metrics::counter!("replication_passes_total").increment(1);
        tracing::debug!(categories, products, "replica synced");

        Ok(ReplicationReport {
            categories,
            products,
            synced_at,
        })
    }

    /// Runs a pass every `interval` until `cancel` fires.
    ///
    /// A failed pass is logged and retried on the next tick.
    pub fn spawn(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tracing::info!(interval_ms = interval.as_millis() as u64, "replicator started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = self.sync_once().await {
                            tracing::warn!(error = %err, "replication pass failed");
                        }
                    }
                }
            }

            tracing::info!("replicator stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_model::ReadModel;
    use domain::{Category, CategoryName, CategoryRepository, StorageError, TransactionManager};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn commit_category(store: &InMemoryStore, name: &str) {
        let mut tx = store.begin().await.unwrap();
        CategoryRepository::create(store, &mut tx, &Category::new(CategoryName::new(name).unwrap()))
            .await
            .unwrap();
        store.complete(&mut tx, None).await.unwrap();
    }

    #[tokio::test]
    async fn replica_lags_until_sync() {
        let store = InMemoryStore::new();
        let replica = ReplicaStore::new();
        let replicator = Replicator::new(store.clone(), replica.clone());

        commit_category(&store, "Stationery").await;
        assert!(replica.categories().await.unwrap().is_empty());

        let report = replicator.sync_once().await.unwrap();
        assert_eq!(report.categories, 1);
        assert_eq!(replica.categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn uncommitted_changes_are_not_replicated() {
        let store = InMemoryStore::new();
        let replica = ReplicaStore::new();
        let replicator = Replicator::new(store.clone(), replica.clone());

        {
            let mut tx = store.begin().await.unwrap();
            let category = Category::new(CategoryName::new("Draft").unwrap());
            CategoryRepository::create(&store, &mut tx, &category)
                .await
                .unwrap();
        }

        let report = replicator.sync_once().await.unwrap();
        assert_eq!(report.categories, 0);
    }

    struct FlakySource {
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ReplicationSource for FlakySource {
        async fn snapshot(&self) -> StorageResult<CatalogSnapshot> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("primary down".to_string()));
            }
            Ok(CatalogSnapshot::default())
        }
    }

    #[tokio::test]
    async fn failed_pass_leaves_replica_untouched() {
        let replica = ReplicaStore::new();
        let replicator = Replicator::new(
            FlakySource {
                fail: Arc::new(AtomicBool::new(true)),
            },
            replica.clone(),
        );

        assert!(replicator.sync_once().await.is_err());
        assert!(replica.synced_at().await.is_none());
    }

    #[tokio::test]
    async fn spawned_replicator_catches_up_and_stops_on_cancel() {
        let store = InMemoryStore::new();
        let replica = ReplicaStore::new();
        let cancel = CancellationToken::new();
        let handle = Replicator::new(store.clone(), replica.clone())
            .spawn(Duration::from_millis(10), cancel.clone());

        commit_category(&store, "Stationery").await;

        let caught_up = tokio::time::timeout(Duration::from_secs(2), async {
            while replica.categories().await.unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(caught_up.is_ok(), "replica never caught up");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("replicator did not stop")
            .unwrap();
    }
}
