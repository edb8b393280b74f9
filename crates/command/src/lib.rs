//! Command side of the catalog.
//!
//! Each operation validates its input into domain value objects, runs inside
//! one storage transaction and finalizes it exactly once: commit on success,
//! rollback on failure. A handle dropped by a cancelled caller is rolled back
//! by the store.

pub mod category_service;
pub mod commands;
pub mod error;
pub mod product_service;
pub mod server;
mod transaction;

pub use category_service::CategoryService;
pub use commands::{
    AddCategory, AddProduct, DeleteCategory, DeleteProduct, UpdateCategory, UpdateProduct,
};
pub use error::{Result, ServiceError};
pub use product_service::ProductService;
pub use server::CommandServer;
