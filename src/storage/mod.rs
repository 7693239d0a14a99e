//! Storage implementations for different backends

pub mod error;
pub mod in_memory;

#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use error::{StorageError, StorageResult};
pub use in_memory::{InMemoryPostStore, InMemoryUserStore};

#[cfg(feature = "mongodb_backend")]
pub use self::mongodb::{MongoPostStore, MongoUserStore};
