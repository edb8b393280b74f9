//! Query side of the catalog.
//!
//! This crate serves reads from a copy of the catalog that may lag behind
//! the command side:
//! - [`ReadModel`] trait for query access to categories and products
//! - [`ReplicaStore`] and [`Replicator`] for an in-memory replica fed from
//!   the primary store
//! - [`PostgresReadModel`] for a replicated PostgreSQL database
//! - [`QueryService`], the query backend over any read model

pub mod error;
pub mod postgres;
pub mod read_model;
pub mod replica;
pub mod replicator;
pub mod service;

pub use error::{QueryError, Result};
pub use postgres::PostgresReadModel;
pub use read_model::{ProductRows, ReadModel};
pub use replica::ReplicaStore;
pub use replicator::{ReplicationReport, ReplicationSource, Replicator};
pub use service::QueryService;
