//! Client side of the catalog.
//!
//! [`CqrsRepository`] writes through the command backend and reads through the
//! query backend. Reads may lag behind writes; callers that need to observe
//! their own write poll the read side.

pub mod error;
pub mod repository;
pub mod stream;

pub use error::{ClientError, Result};
pub use repository::CqrsRepository;
pub use stream::ProductReceiver;
