//! Storage adapters for the catalog command side.
//!
//! Both adapters implement the transaction-manager and repository ports from
//! the `domain` crate with a shared handle type:
//! - [`InMemoryStore`] for tests and local runs
//! - [`PostgresStore`] backed by `sqlx`

pub mod error;
pub mod memory;
pub mod postgres;
pub mod snapshot;

pub use memory::{InMemoryStore, InMemoryTransaction, TransactionStats};
pub use postgres::{PgTransaction, PostgresStore};
pub use snapshot::CatalogSnapshot;
