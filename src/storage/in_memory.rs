//! In-memory implementation of the user and post stores for testing and development

use crate::core::entity::{Post, User};
use crate::core::store::{PostStore, UserStore};
use crate::storage::error::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

fn lock_error<T>(e: PoisonError<T>) -> StorageError {
    StorageError::Lock(e.to_string())
}

/// In-memory user store
///
/// Uses RwLock for thread-safe access. The email uniqueness check and the
/// insert happen under the same write lock.
#[derive(Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> StorageResult<User> {
        let mut users = self.users.write().map_err(lock_error)?;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(StorageError::DuplicateKey {
                collection: "users".to_string(),
                key: "email".to_string(),
            });
        }

        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: &Uuid) -> StorageResult<Option<User>> {
        let users = self.users.read().map_err(lock_error)?;

        Ok(users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let users = self.users.read().map_err(lock_error)?;

        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn add_post_ref(&self, user_id: &Uuid, post_id: &Uuid) -> StorageResult<()> {
        let mut users = self.users.write().map_err(lock_error)?;

        let user = users.get_mut(user_id).ok_or_else(|| StorageError::NotFound {
            collection: "users".to_string(),
            id: user_id.to_string(),
        })?;

        if !user.posts.contains(post_id) {
            user.posts.push(*post_id);
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn remove_post_ref(&self, user_id: &Uuid, post_id: &Uuid) -> StorageResult<()> {
        let mut users = self.users.write().map_err(lock_error)?;

        let user = users.get_mut(user_id).ok_or_else(|| StorageError::NotFound {
            collection: "users".to_string(),
            id: user_id.to_string(),
        })?;

        user.posts.retain(|id| id != post_id);
        user.updated_at = Utc::now();

        Ok(())
    }
}

/// In-memory post store
///
/// Keeps insertion order so posts sharing a creation timestamp still list
/// newest first.
#[derive(Clone)]
pub struct InMemoryPostStore {
    posts: Arc<RwLock<IndexMap<Uuid, Post>>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    fn version_conflict(id: &Uuid) -> StorageError {
        StorageError::VersionConflict {
            collection: "posts".to_string(),
            id: id.to_string(),
        }
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: Post) -> StorageResult<Post> {
        let mut posts = self.posts.write().map_err(lock_error)?;

        if posts.contains_key(&post.id) {
            return Err(StorageError::DuplicateKey {
                collection: "posts".to_string(),
                key: "_id".to_string(),
            });
        }

        posts.insert(post.id, post.clone());

        Ok(post)
    }

    async fn get(&self, id: &Uuid) -> StorageResult<Option<Post>> {
        let posts = self.posts.read().map_err(lock_error)?;

        Ok(posts.get(id).cloned())
    }

    async fn list_page(&self, offset: usize, limit: usize) -> StorageResult<Vec<Post>> {
        let posts = self.posts.read().map_err(lock_error)?;

        let mut newest_first: Vec<&Post> = posts.values().rev().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(newest_first
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> StorageResult<u64> {
        let posts = self.posts.read().map_err(lock_error)?;

        Ok(posts.len() as u64)
    }

    async fn update(&self, post: Post) -> StorageResult<Post> {
        let mut posts = self.posts.write().map_err(lock_error)?;

        let stored = posts.get_mut(&post.id).ok_or_else(|| StorageError::NotFound {
            collection: "posts".to_string(),
            id: post.id.to_string(),
        })?;

        if stored.version != post.version {
            return Err(Self::version_conflict(&post.id));
        }

        *stored = Post {
            version: post.version + 1,
            ..post
        };

        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid, expected_version: i64) -> StorageResult<()> {
        let mut posts = self.posts.write().map_err(lock_error)?;

        match posts.get(id) {
            None => Err(StorageError::NotFound {
                collection: "posts".to_string(),
                id: id.to_string(),
            }),
            Some(stored) if stored.version != expected_version => {
                Err(Self::version_conflict(id))
            }
            Some(_) => {
                posts.shift_remove(id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new("Alice".to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = InMemoryUserStore::new();
        store.insert(user("alice@test.com")).await.unwrap();

        let err = store.insert(user("alice@test.com")).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_with_same_email_admit_one() {
        let store = InMemoryUserStore::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(user("race@test.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_post_refs_are_a_set() {
        let store = InMemoryUserStore::new();
        let alice = store.insert(user("alice@test.com")).await.unwrap();
        let post_id = Uuid::new_v4();

        store.add_post_ref(&alice.id, &post_id).await.unwrap();
        store.add_post_ref(&alice.id, &post_id).await.unwrap();
        assert_eq!(
            store.find_by_id(&alice.id).await.unwrap().unwrap().posts,
            vec![post_id]
        );

        store.remove_post_ref(&alice.id, &post_id).await.unwrap();
        assert!(store.find_by_id(&alice.id).await.unwrap().unwrap().posts.is_empty());
    }

    #[tokio::test]
    async fn test_add_post_ref_unknown_user() {
        let store = InMemoryUserStore::new();
        let err = store
            .add_post_ref(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stale_update_is_rejected() {
        let store = InMemoryPostStore::new();
        let post = store
            .insert(Post::new("Title".into(), "Content".into(), None, Uuid::new_v4()))
            .await
            .unwrap();

        let first = store
            .update(Post {
                title: "First".into(),
                ..post.clone()
            })
            .await
            .unwrap();
        assert_eq!(first.version, 1);

        let err = store
            .update(Post {
                title: "Second".into(),
                ..post.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::VersionConflict { .. }));

        let err = store.delete(&post.id, 0).await.unwrap_err();
        assert!(matches!(err, StorageError::VersionConflict { .. }));
        store.delete(&post.id, 1).await.unwrap();
        assert!(store.get(&post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_timestamp_lists_latest_insert_first() {
        let store = InMemoryPostStore::new();
        let creator = Uuid::new_v4();
        let now = Utc::now();

        let mut ids = Vec::new();
        for i in 0..3 {
            let mut post = Post::new(format!("Post {}", i), "Content".into(), None, creator);
            post.created_at = now;
            ids.push(store.insert(post).await.unwrap().id);
        }

        let listed: Vec<Uuid> = store
            .list_page(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);
    }
}
