use command::{AddCategory, AddProduct, CategoryService, ProductService};
use criterion::{Criterion, criterion_group, criterion_main};
use store::InMemoryStore;

fn bench_add_category(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let service = CategoryService::new(store.clone(), store);
    let mut n = 0u64;

    c.bench_function("command/add_category", |b| {
        b.iter(|| {
            n += 1;
            rt.block_on(service.add(AddCategory::new(format!("cat-{n}"))))
                .unwrap();
        });
    });
}

fn bench_add_product(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let categories = CategoryService::new(store.clone(), store.clone());
    let products = ProductService::new(store.clone(), store);
    let stationery = rt
        .block_on(categories.add(AddCategory::new("Stationery")))
        .unwrap();
    let mut n = 0u64;

    c.bench_function("command/add_product", |b| {
        b.iter(|| {
            n += 1;
            rt.block_on(products.add(AddProduct::new(
                format!("product-{n}"),
                100,
                stationery.clone(),
            )))
            .unwrap();
        });
    });
}

criterion_group!(benches, bench_add_category, bench_add_product);
criterion_main!(benches);
