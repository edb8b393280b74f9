//! Domain layer for the catalog services.
//!
//! This crate provides:
//! - Self-validating value objects (ids, names, price)
//! - The `Category` and `Product` entities and their DTO conversions
//! - The error taxonomy shared by storage adapters and services
//! - Repository and transaction-manager ports implemented by storage adapters

pub mod category;
pub mod error;
pub mod ports;
pub mod product;
pub mod value_objects;

pub use category::Category;
pub use error::{EntityKind, StorageError, StorageResult, ValidationError};
pub use ports::{CategoryRepository, Outcome, ProductRepository, TransactionManager};
pub use product::Product;
pub use value_objects::{CategoryId, CategoryName, ProductId, ProductName, ProductPrice};
