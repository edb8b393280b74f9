//! HTTP API server with observability for the catalog services.
//!
//! Fronts the catalog client repository with JSON endpoints for categories
//! and products, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use command::CommandServer;
use metrics_exporter_prometheus::PrometheusHandle;
use query::{PostgresReadModel, QueryService, ReplicaStore, Replicator};
use sqlx::postgres::PgPoolOptions;
use store::{InMemoryStore, PostgresStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::StartupError;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/categories",
            get(routes::categories::list).post(routes::categories::create),
        )
        .route(
            "/categories/{id}",
            get(routes::categories::get)
                .put(routes::categories::update)
                .delete(routes::categories::delete),
        )
        .route(
            "/products",
            get(routes::products::list).post(routes::products::create),
        )
        .route("/products/search", get(routes::products::search))
        .route("/products/stream", get(routes::products::stream))
        .route(
            "/products/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires both sides over one in-memory store.
///
/// The query side reads a replica refreshed every `replication_interval` by a
/// background replicator, which runs until `cancel` fires.
pub fn create_in_memory_state(
    replication_interval: Duration,
    cancel: CancellationToken,
) -> (Arc<AppState>, JoinHandle<()>) {
    let store = InMemoryStore::new();
    let replica = ReplicaStore::new();
    let replicator =
        Replicator::new(store.clone(), replica.clone()).spawn(replication_interval, cancel);

    let state = Arc::new(AppState::new(
        Arc::new(CommandServer::from_store(store)),
        Arc::new(QueryService::new(replica)),
    ));
    (state, replicator)
}

/// Wires the command side to the primary database and the query side to the
/// replica database, running migrations on the primary first.
pub async fn create_postgres_state(
    database_url: &str,
    replica_database_url: &str,
    max_connections: u32,
) -> Result<Arc<AppState>, StartupError> {
    let primary = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    let store = PostgresStore::new(primary);
    store.run_migrations().await?;

    let replica = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(replica_database_url)
        .await?;

    Ok(Arc::new(AppState::new(
        Arc::new(CommandServer::from_store(store)),
        Arc::new(QueryService::new(PostgresReadModel::new(replica))),
    )))
}

/// Builds the state selected by `config`: PostgreSQL when `DATABASE_URL` is
/// set, otherwise the in-memory store with a replicator.
pub async fn create_state(
    config: &Config,
    cancel: CancellationToken,
) -> Result<(Arc<AppState>, Option<JoinHandle<()>>), StartupError> {
    match (&config.database_url, &config.replica_database_url) {
        (Some(primary), replica) => {
            let replica = replica.as_deref().unwrap_or(primary.as_str());
            let state =
                create_postgres_state(primary, replica, config.database_max_connections).await?;
            Ok((state, None))
        }
        (None, _) => {
            let (state, replicator) = create_in_memory_state(config.replication_interval, cancel);
            Ok((state, Some(replicator)))
        }
    }
}
