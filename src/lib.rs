//! # feed
//!
//! Backend for a social feed: users register and log in, then create, edit
//! and delete posts with optional images, and page through the feed.
//!
//! ## Features
//!
//! - **Token gate**: every request carries an [`AuthContext`](core::auth::AuthContext)
//!   resolved from an `Authorization: Bearer <token>` header; operations decide
//!   whether an anonymous caller is acceptable
//! - **GraphQL API**: `login`, `posts`, `post`, `createUser`, `createPost`,
//!   `updatePost` and `deletePost` over `POST /graphql`
//! - **Collected validation**: every rule violation of an input is reported at once
//! - **Ownership checks**: only a post's creator may edit or delete it
//! - **Pluggable storage**: in-memory stores, or MongoDB behind the
//!   `mongodb_backend` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feed::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new(FeedConfig::load()?)
//!         .with_user_store(InMemoryUserStore::default())
//!         .with_post_store(InMemoryPostStore::default())
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthProvider, JwtAuthProvider, NoAuthProvider},
        entity::{Entity, Post, User},
        error::FeedError,
        media::{ImageStore, LocalImageStore},
        password::PasswordHasher,
        service::{FeedService, PostInput, UserInput},
        store::{PostStore, UserStore},
        token::{Claims, TokenIssuer},
        view::{AuthData, PostPage, PostView, UserView},
    };

    // === Storage ===
    pub use crate::storage::{InMemoryPostStore, InMemoryUserStore, StorageError};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoPostStore, MongoUserStore};

    // === Config ===
    pub use crate::config::{FeedConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
