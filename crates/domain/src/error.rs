//! Domain error types.

use thiserror::Error;

/// The kind of catalog entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Category,
    Product,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Category => "category",
            EntityKind::Product => "product",
        }
    }

    /// Stable message reported when an entity of this kind is missing.
    pub fn not_found_reason(&self) -> &'static str {
        match self {
            EntityKind::Category => common::status::CATEGORY_NOT_FOUND,
            EntityKind::Product => common::status::PRODUCT_NOT_FOUND,
        }
    }

    /// Stable message reported when a same-named entity already exists.
    pub fn already_exists_reason(&self) -> &'static str {
        match self {
            EntityKind::Category => common::status::CATEGORY_ALREADY_EXISTS,
            EntityKind::Product => common::status::PRODUCT_ALREADY_EXISTS,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value object was constructed from out-of-range input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field}: {value:?} is not a lowercase 8-4-4-4-12 UUID")]
    InvalidId { field: &'static str, value: String },

    #[error("invalid {field}: length {length} is outside {min}..={max} characters")]
    InvalidLength {
        field: &'static str,
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("invalid {field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Errors reported by storage adapters through the repository and
/// transaction ports.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The targeted row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// A uniqueness constraint rejected the write.
    #[error("{entity} already exists: {name}")]
    Duplicate { entity: EntityKind, name: String },

    /// The row cannot be deleted while other rows reference it.
    #[error("{entity} {id} is still referenced")]
    StillReferenced { entity: EntityKind, id: String },

    /// No connection or transaction could be obtained.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The handle was already committed or rolled back.
    #[error("transaction already finalized")]
    TransactionFinalized,

    /// A stored row no longer satisfies the value-object invariants.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] ValidationError),

    /// Any other driver failure.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StorageError::Backend(Box::new(err))
    }

    pub fn not_found(entity: EntityKind, id: impl std::fmt::Display) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Result type for storage port operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
