//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoUserStore` and `MongoPostStore`, both backed by a
//! `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! One collection per entity type, named after `Entity::resource_name()`
//! (`users`, `posts`). Email uniqueness is enforced by a unique index on
//! `users.email`, created by [`connect`] / [`ensure_indexes`]. Owned-post
//! references are maintained with `$addToSet` / `$pull`, and post writes
//! filter on the stored `version`.
//!
//! # Serialization strategy
//!
//! Entities are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. UUIDs are stored as strings, timestamps as
//! integer microseconds. The `id` field is mapped to MongoDB's `_id`.
//!
//! Every driver call is bounded by the configured timeout.

use crate::config::StorageConfig;
use crate::core::entity::{Entity, Post, User};
use crate::core::store::{PostStore, UserStore};
use crate::storage::error::{StorageError, StorageResult};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::IntoFuture;
use std::time::Duration;
use uuid::Uuid;

const BACKEND: &str = "mongodb";
const DUPLICATE_KEY_CODE: i32 = 11000;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: serde_json::Value) -> StorageResult<Document> {
    let bson_val = mongodb::bson::to_bson(&json).map_err(|e| backend_error(e.to_string()))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(backend_error("expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value,
/// renaming `_id` → `id` for domain entity convention.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn entity_to_document<T: Entity + Serialize>(entity: &T) -> StorageResult<Document> {
    let json = serde_json::to_value(entity).map_err(|e| backend_error(e.to_string()))?;
    json_to_document(json)
}

fn document_to_entity<T: Entity + DeserializeOwned>(doc: Document) -> StorageResult<T> {
    serde_json::from_value(document_to_json(doc)).map_err(|e| {
        backend_error(format!(
            "failed to deserialize {}: {}",
            T::resource_name_singular(),
            e
        ))
    })
}

fn id_filter(id: &Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

fn backend_error(message: impl Into<String>) -> StorageError {
    StorageError::Backend {
        backend: BACKEND.to_string(),
        message: message.into(),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

// ---------------------------------------------------------------------------
// Shared connection handle
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct MongoBackend {
    database: Database,
    timeout: Duration,
}

impl MongoBackend {
    fn collection<T: Entity>(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::resource_name())
    }

    /// Run a driver call, failing with `StorageError::Timeout` past the deadline
    async fn bounded<T, F>(&self, operation: &str, call: F) -> StorageResult<T>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(backend_error(format!("{} failed: {}", operation, e))),
            Err(_) => Err(StorageError::Timeout {
                backend: BACKEND.to_string(),
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    async fn find_one_entity<T: Entity + DeserializeOwned>(
        &self,
        operation: &str,
        filter: Document,
    ) -> StorageResult<Option<T>> {
        let doc = self
            .bounded(operation, self.collection::<T>().find_one(filter))
            .await?;

        doc.map(document_to_entity).transpose()
    }

    /// Explain why a filtered write matched nothing
    async fn missing_or_conflict<T: Entity>(&self, id: &Uuid) -> StorageError {
        match self
            .bounded("lookup", self.collection::<T>().find_one(id_filter(id)))
            .await
        {
            Ok(Some(_)) => StorageError::VersionConflict {
                collection: T::resource_name().to_string(),
                id: id.to_string(),
            },
            Ok(None) => StorageError::NotFound {
                collection: T::resource_name().to_string(),
                id: id.to_string(),
            },
            Err(e) => e,
        }
    }
}

/// Connect to MongoDB and build both stores, creating indexes on the way.
pub async fn connect(config: &StorageConfig) -> Result<(MongoUserStore, MongoPostStore)> {
    let uri = config
        .mongodb_uri
        .as_deref()
        .ok_or_else(|| anyhow!("storage.mongodb_uri is required for the mongodb backend"))?;

    let client = Client::with_uri_str(uri)
        .await
        .context("failed to connect to MongoDB")?;
    let database = client.database(&config.database);
    let timeout = Duration::from_millis(config.timeout_ms);

    ensure_indexes(&database).await?;

    Ok((
        MongoUserStore::new(database.clone(), timeout),
        MongoPostStore::new(database, timeout),
    ))
}

/// Create the unique email index and the feed ordering index.
///
/// Posts sharing a timestamp are ordered by `_id` so pages never overlap.
pub async fn ensure_indexes(database: &Database) -> Result<()> {
    let unique_email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    database
        .collection::<Document>(User::resource_name())
        .create_index(unique_email)
        .await
        .context("failed to create users.email index")?;

    let newest_first = IndexModel::builder()
        .keys(doc! { "created_at": -1, "_id": -1 })
        .build();
    database
        .collection::<Document>(Post::resource_name())
        .create_index(newest_first)
        .await
        .context("failed to create posts.created_at index")?;

    tracing::debug!("MongoDB indexes ensured");
    Ok(())
}

// ---------------------------------------------------------------------------
// MongoUserStore
// ---------------------------------------------------------------------------

/// Credential store backed by the `users` collection.
#[derive(Clone, Debug)]
pub struct MongoUserStore {
    backend: MongoBackend,
}

impl MongoUserStore {
    pub fn new(database: Database, timeout: Duration) -> Self {
        Self {
            backend: MongoBackend { database, timeout },
        }
    }

    async fn update_refs(&self, user_id: &Uuid, update: Document) -> StorageResult<()> {
        let result = self
            .backend
            .bounded(
                "update user posts",
                self.backend
                    .collection::<User>()
                    .update_one(id_filter(user_id), update),
            )
            .await?;

        if result.matched_count == 0 {
            return Err(StorageError::NotFound {
                collection: User::resource_name().to_string(),
                id: user_id.to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: User) -> StorageResult<User> {
        let doc = entity_to_document(&user)?;

        match tokio::time::timeout(
            self.backend.timeout,
            self.backend.collection::<User>().insert_one(doc).into_future(),
        )
        .await
        {
            Ok(Ok(_)) => Ok(user),
            Ok(Err(e)) if is_duplicate_key(&e) => Err(StorageError::DuplicateKey {
                collection: User::resource_name().to_string(),
                key: "email".to_string(),
            }),
            Ok(Err(e)) => Err(backend_error(format!("insert user failed: {}", e))),
            Err(_) => Err(StorageError::Timeout {
                backend: BACKEND.to_string(),
                after_ms: self.backend.timeout.as_millis() as u64,
            }),
        }
    }

    async fn find_by_id(&self, id: &Uuid) -> StorageResult<Option<User>> {
        self.backend
            .find_one_entity::<User>("find user", id_filter(id))
            .await
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        self.backend
            .find_one_entity::<User>("find user by email", doc! { "email": email })
            .await
    }

    async fn add_post_ref(&self, user_id: &Uuid, post_id: &Uuid) -> StorageResult<()> {
        self.update_refs(
            user_id,
            doc! {
                "$addToSet": { "posts": post_id.to_string() },
                "$set": { "updated_at": Utc::now().timestamp_micros() },
            },
        )
        .await
    }

    async fn remove_post_ref(&self, user_id: &Uuid, post_id: &Uuid) -> StorageResult<()> {
        self.update_refs(
            user_id,
            doc! {
                "$pull": { "posts": post_id.to_string() },
                "$set": { "updated_at": Utc::now().timestamp_micros() },
            },
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// MongoPostStore
// ---------------------------------------------------------------------------

/// Post store backed by the `posts` collection.
#[derive(Clone, Debug)]
pub struct MongoPostStore {
    backend: MongoBackend,
}

impl MongoPostStore {
    pub fn new(database: Database, timeout: Duration) -> Self {
        Self {
            backend: MongoBackend { database, timeout },
        }
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn insert(&self, post: Post) -> StorageResult<Post> {
        let doc = entity_to_document(&post)?;

        self.backend
            .bounded(
                "insert post",
                self.backend.collection::<Post>().insert_one(doc),
            )
            .await?;

        Ok(post)
    }

    async fn get(&self, id: &Uuid) -> StorageResult<Option<Post>> {
        self.backend
            .find_one_entity::<Post>("find post", id_filter(id))
            .await
    }

    async fn list_page(&self, offset: usize, limit: usize) -> StorageResult<Vec<Post>> {
        let cursor = self
            .backend
            .bounded(
                "list posts",
                self.backend
                    .collection::<Post>()
                    .find(doc! {})
                    .sort(doc! { "created_at": -1, "_id": -1 })
                    .skip(offset as u64)
                    .limit(limit as i64),
            )
            .await?;

        let docs: Vec<Document> = self
            .backend
            .bounded("collect posts", cursor.try_collect())
            .await?;

        docs.into_iter().map(document_to_entity).collect()
    }

    async fn count(&self) -> StorageResult<u64> {
        self.backend
            .bounded(
                "count posts",
                self.backend.collection::<Post>().count_documents(doc! {}),
            )
            .await
    }

    async fn update(&self, post: Post) -> StorageResult<Post> {
        let expected = post.version;
        let stored = Post {
            version: expected + 1,
            ..post
        };
        let doc = entity_to_document(&stored)?;

        let result = self
            .backend
            .bounded(
                "update post",
                self.backend.collection::<Post>().replace_one(
                    doc! { "_id": stored.id.to_string(), "version": expected },
                    doc,
                ),
            )
            .await?;

        if result.matched_count == 0 {
            return Err(self.backend.missing_or_conflict::<Post>(&stored.id).await);
        }

        Ok(stored)
    }

    async fn delete(&self, id: &Uuid, expected_version: i64) -> StorageResult<()> {
        let result = self
            .backend
            .bounded(
                "delete post",
                self.backend
                    .collection::<Post>()
                    .delete_one(doc! { "_id": id.to_string(), "version": expected_version }),
            )
            .await?;

        if result.deleted_count == 0 {
            return Err(self.backend.missing_or_conflict::<Post>(id).await);
        }

        Ok(())
    }
}
