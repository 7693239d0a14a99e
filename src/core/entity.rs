//! Persisted entities: users and their posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base trait for all persisted entities.
///
/// All entities have:
/// - id: Unique identifier
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
///
/// Storage backends use `resource_name()` as the collection name.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used as collection name (e.g., "users")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "user")
    fn resource_name_singular() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;
}

/// A registered account.
///
/// Timestamps are stored as integer microseconds so every backend orders them
/// numerically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash, never the raw password
    pub password_hash: String,
    /// Ids of the posts this user created, in creation order
    #[serde(default)]
    pub posts: Vec<Uuid>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            posts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for User {
    fn resource_name() -> &'static str {
        "users"
    }

    fn resource_name_singular() -> &'static str {
        "user"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// A feed entry.
///
/// `creator` is fixed at construction. `version` increases on every write and
/// backs optimistic concurrency checks in the stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub creator: Uuid,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: i64,
}

impl Post {
    pub fn new(title: String, content: String, image_url: Option<String>, creator: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            image_url,
            creator,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn is_created_by(&self, user_id: Uuid) -> bool {
        self.creator == user_id
    }
}

impl Entity for Post {
    fn resource_name() -> &'static str {
        "posts"
    }

    fn resource_name_singular() -> &'static str {
        "post"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
