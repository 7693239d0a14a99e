//! Store traits for users and posts
//!
//! The operations are agnostic to the underlying storage mechanism. Each
//! backend must uphold:
//! - `UserStore::insert` rejects a second user with the same email
//!   (`StorageError::DuplicateKey`), even under concurrent inserts
//! - owned-post references are added and removed atomically, without
//!   rewriting the whole user
//! - `PostStore::update` and `PostStore::delete` only apply when the stored
//!   version still equals the expected one (`StorageError::VersionConflict`)

use crate::core::entity::{Post, User};
use crate::storage::error::StorageResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user
    async fn insert(&self, user: User) -> StorageResult<User>;

    /// Get a user by ID
    async fn find_by_id(&self, id: &Uuid) -> StorageResult<Option<User>>;

    /// Get a user by email (exact match)
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>>;

    /// Append a post id to the user's owned set (no-op if already present)
    async fn add_post_ref(&self, user_id: &Uuid, post_id: &Uuid) -> StorageResult<()>;

    /// Remove a post id from the user's owned set
    async fn remove_post_ref(&self, user_id: &Uuid, post_id: &Uuid) -> StorageResult<()>;
}

/// Post store
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a new post
    async fn insert(&self, post: Post) -> StorageResult<Post>;

    /// Get a post by ID
    async fn get(&self, id: &Uuid) -> StorageResult<Option<Post>>;

    /// List a window of posts, newest first
    async fn list_page(&self, offset: usize, limit: usize) -> StorageResult<Vec<Post>>;

    /// Count every post, regardless of any window
    async fn count(&self) -> StorageResult<u64>;

    /// Replace a post whose stored version equals `post.version`
    ///
    /// Returns the stored post with its version incremented.
    async fn update(&self, post: Post) -> StorageResult<Post>;

    /// Delete a post whose stored version equals `expected_version`
    async fn delete(&self, id: &Uuid, expected_version: i64) -> StorageResult<()>;
}
