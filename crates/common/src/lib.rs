//! RPC contract shared by the catalog services.
//!
//! Holds the transport DTOs, request messages, the `(code, message)` error
//! pair, and the Command/Query backend traits that servers implement and the
//! client consumes.

pub mod backend;
pub mod status;
pub mod types;

pub use backend::{
    BoxedServerStream, CommandBackend, ProductStream, QueryBackend, RpcResult, ServerStream,
};
pub use status::{Code, Status};
pub use types::{
    CategoryDto, CreateCategoryRequest, CreateProductRequest, ProductDto, UpdateCategoryRequest,
    UpdateProductRequest,
};
