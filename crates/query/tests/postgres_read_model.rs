//! PostgreSQL read model integration tests
//!
//! These tests use a shared PostgreSQL container and clear the tables before
//! each test, so they run serially.
//!
//! ```bash
//! cargo test -p query --test postgres_read_model
//! ```

use std::sync::Arc;

use domain::{
    Category, CategoryName, CategoryRepository, Product, ProductName, ProductPrice,
    ProductRepository, TransactionManager,
};
use futures_util::TryStreamExt;
use query::{PostgresReadModel, ReadModel};
use serial_test::serial;
use sqlx::PgPool;
use store::PostgresStore;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_catalog_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Primary store and read model sharing one freshly cleared database.
async fn get_test_pair() -> (PostgresStore, PostgresReadModel) {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE products, categories")
        .execute(&pool)
        .await
        .unwrap();

    (PostgresStore::new(pool.clone()), PostgresReadModel::new(pool))
}

async fn seed(store: &PostgresStore, category: &str, products: &[(&str, u32)]) -> Category {
    let category = Category::new(CategoryName::new(category).unwrap());
    let mut tx = store.begin().await.unwrap();
    CategoryRepository::create(store, &mut tx, &category)
        .await
        .unwrap();
    for (name, price) in products {
        let product = Product::new(
            ProductName::new(*name).unwrap(),
            ProductPrice::new(*price).unwrap(),
            category.clone(),
        );
        ProductRepository::create(store, &mut tx, &product)
            .await
            .unwrap();
    }
    store.complete(&mut tx, None).await.unwrap();
    category
}

#[tokio::test]
#[serial]
async fn lists_are_ordered_and_joined() {
    let (store, read_model) = get_test_pair().await;
    let stationery = seed(&store, "Stationery", &[("Pencil", 50), ("Eraser", 20)]).await;

    let categories = read_model.categories().await.unwrap();
    assert_eq!(categories, vec![stationery.clone()]);

    let products = read_model.products().await.unwrap();
    let names: Vec<_> = products.iter().map(|p| p.name().value()).collect();
    assert_eq!(names, ["Eraser", "Pencil"]);
    assert!(products.iter().all(|p| p.category() == &stationery));
}

#[tokio::test]
#[serial]
async fn mixed_case_names_sort_case_insensitively() {
    let (store, read_model) = get_test_pair().await;
    seed(
        &store,
        "Stationery",
        &[("pencil", 50), ("Eraser", 20), ("eraser", 25), ("Binder", 300)],
    )
    .await;

    let products = read_model.products().await.unwrap();
    let names: Vec<_> = products.iter().map(|p| p.name().value()).collect();
    assert_eq!(names, ["Binder", "Eraser", "eraser", "pencil"]);
}

#[tokio::test]
#[serial]
async fn lookups_return_none_when_absent() {
    let (store, read_model) = get_test_pair().await;
    let stationery = seed(&store, "Stationery", &[]).await;

    assert_eq!(
        read_model.category(&stationery.id()).await.unwrap(),
        Some(stationery)
    );
    assert!(
        read_model
            .product(&domain::ProductId::generate())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn search_is_case_insensitive_and_literal() {
    let (store, read_model) = get_test_pair().await;
    seed(
        &store,
        "Stationery",
        &[("Fountain Pen", 900), ("Pencil", 50), ("100% Recycled Pad", 300)],
    )
    .await;

    let found = read_model.search_products("PEN").await.unwrap();
    let names: Vec<_> = found.iter().map(|p| p.name().value()).collect();
    assert_eq!(names, ["Fountain Pen", "Pencil"]);

    let found = read_model.search_products("0%").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
#[serial]
async fn stream_pages_through_every_product() {
    let (store, read_model) = get_test_pair().await;
    let names: Vec<String> = (0..250).map(|i| format!("Item {i:03}")).collect();
    let products: Vec<(&str, u32)> = names.iter().map(|name| (name.as_str(), 10)).collect();
    seed(&store, "Bulk", &products).await;

    let streamed: Vec<Product> = read_model
        .stream_products()
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(streamed.len(), 250);
    let mut ids: Vec<_> = streamed.iter().map(|p| p.id().as_uuid()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 250);
}
