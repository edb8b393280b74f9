use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Category, CategoryName, Product, ProductName, ProductPrice};
use query::{ReadModel, ReplicaStore};
use store::CatalogSnapshot;

/// Builds a snapshot of one category with `n` products.
fn snapshot(n: usize) -> CatalogSnapshot {
    let category = Category::new(CategoryName::new("Stationery").unwrap());
    let products = (0..n)
        .map(|i| {
            Product::new(
                ProductName::new(format!("Product {i}")).unwrap(),
                ProductPrice::new(100).unwrap(),
                category.clone(),
            )
        })
        .collect();
    CatalogSnapshot {
        categories: vec![category],
        products,
    }
}

fn bench_apply_1000_products(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let snapshot = snapshot(1000);

    c.bench_function("query/apply_1000_products", |b| {
        b.iter(|| {
            rt.block_on(async {
                let replica = ReplicaStore::new();
                replica.apply(snapshot.clone()).await;
            });
        });
    });
}

fn bench_search_1000_products(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let replica = ReplicaStore::new();
    rt.block_on(replica.apply(snapshot(1000)));

    c.bench_function("query/search_1000_products", |b| {
        b.iter(|| {
            rt.block_on(replica.search_products("product 9")).unwrap();
        });
    });
}

criterion_group!(benches, bench_apply_1000_products, bench_search_1000_products);
criterion_main!(benches);
