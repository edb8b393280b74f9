use domain::{Category, Product};

/// Committed contents of a store at one point in time.
///
/// Used to seed read replicas; uncommitted transaction state is never part
/// of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.products.is_empty()
    }
}
