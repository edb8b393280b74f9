//! HTTP handlers and the state they share.

use std::sync::Arc;

use client::CqrsRepository;
use common::{CommandBackend, QueryBackend};

pub mod categories;
pub mod health;
pub mod metrics;
pub mod products;

/// Repository over type-erased command and query backends.
pub type CatalogRepository = CqrsRepository<Arc<dyn CommandBackend>, Arc<dyn QueryBackend>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub repository: CatalogRepository,
}

impl AppState {
    pub fn new(command: Arc<dyn CommandBackend>, query: Arc<dyn QueryBackend>) -> Self {
        Self {
            repository: CqrsRepository::new(command, query),
        }
    }
}
