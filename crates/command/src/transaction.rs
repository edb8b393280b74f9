//! Transaction finalization and command instrumentation.

use std::future::Future;
use std::time::Instant;

use domain::TransactionManager;

use crate::error::{Result, ServiceError};

/// Completes `tx` according to `outcome` and returns the caller-visible result.
///
/// A successful body commits; a commit failure replaces the body's result.
/// A failed body rolls back; a rollback failure is logged and the body's
/// error is returned.
pub(crate) async fn finalize<M, T>(transactions: &M, tx: &mut M::Tx, outcome: Result<T>) -> Result<T>
where
    M: TransactionManager,
{
    let reason = outcome
        .as_ref()
        .err()
        .map(|err| err as &(dyn std::error::Error + Send + Sync + 'static));
    let completion = transactions.complete(tx, reason).await;

    match (outcome, completion) {
        (Ok(value), Ok(())) => {
            metrics::counter!("transactions_committed_total").increment(1);
            Ok(value)
        }
        (Ok(_), Err(commit_err)) => {
            tracing::error!(error = %commit_err, "commit failed, discarding result");
            Err(commit_err.into())
        }
        (Err(err), Ok(())) => {
            metrics::counter!("transactions_rolled_back_total").increment(1);
            tracing::warn!(error = %err, "transaction rolled back");
            Err(err)
        }
        (Err(err), Err(rollback_err)) => {
            tracing::error!(
                error = %err,
                rollback_error = %rollback_err,
                "rollback failed"
            );
            Err(err)
        }
    }
}

/// Runs a command body and records its count, failures and duration.
pub(crate) async fn observed<T, F>(operation: &'static str, body: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    metrics::counter!("catalog_commands_total", "operation" => operation).increment(1);
    let started = Instant::now();

    let result = body.await;

    metrics::histogram!("catalog_command_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
    if let Err(err) = &result {
        metrics::counter!("catalog_command_failures_total", "operation" => operation).increment(1);
        if let ServiceError::Validation(reason) = err {
            tracing::debug!(operation, %reason, "command rejected");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{EntityKind, StorageError};
    use store::InMemoryStore;

    #[tokio::test]
    async fn success_commits() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let value = finalize(&store, &mut tx, Ok(7)).await.unwrap();

        assert_eq!(value, 7);
        assert!(tx.is_finalized());
        assert_eq!(store.stats().committed, 1);
    }

    #[tokio::test]
    async fn failure_rolls_back_and_keeps_error() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let err = ServiceError::Storage(StorageError::not_found(EntityKind::Product, "x"));

        let result: Result<()> = finalize(&store, &mut tx, Err(err)).await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(store.stats().rolled_back, 1);
    }

    #[tokio::test]
    async fn commit_failure_replaces_success() {
        let store = InMemoryStore::new();
        store.fail_next_commit();
        let mut tx = store.begin().await.unwrap();

        let result = finalize(&store, &mut tx, Ok("done")).await;

        assert!(matches!(
            result,
            Err(ServiceError::Storage(StorageError::Unavailable(_)))
        ));
        assert_eq!(store.stats().committed, 0);
    }

    #[tokio::test]
    async fn rollback_failure_keeps_original_error() {
        let store = InMemoryStore::new();
        store.fail_next_rollback();
        let mut tx = store.begin().await.unwrap();
        let err = ServiceError::AlreadyExists {
            entity: EntityKind::Category,
            name: "Stationery".to_string(),
        };

        let result: Result<()> = finalize(&store, &mut tx, Err(err)).await;

        assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));
        assert_eq!(store.stats().failed, 1);
    }

    #[tokio::test]
    async fn already_finalized_handle_is_reported() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        store.complete(&mut tx, None).await.unwrap();

        let result = finalize(&store, &mut tx, Ok(())).await;

        assert!(matches!(
            result,
            Err(ServiceError::Storage(StorageError::TransactionFinalized))
        ));
    }
}
