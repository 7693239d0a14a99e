//! Macro-generated test suite for the `UserStore` / `PostStore` contracts.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use feed::storage::{InMemoryPostStore, InMemoryUserStore};
//!
//! store_contract_tests!(
//!     users: InMemoryUserStore::new(),
//!     posts: InMemoryPostStore::new()
//! );
//! ```
//!
//! # Generated Tests
//!
//! ## Users
//! - `test_insert_and_find_user` — lookup by id and by exact email
//! - `test_find_unknown_user` — both lookups return None
//! - `test_duplicate_email_rejected` — second insert is `DuplicateKey`
//! - `test_concurrent_duplicate_email` — parallel inserts, exactly one wins
//! - `test_post_refs_add_and_remove` — add is idempotent, remove drops the id
//! - `test_post_refs_unknown_user` — `NotFound`
//!
//! ## Posts
//! - `test_insert_and_get_post` — all fields persisted, version 0
//! - `test_get_unknown_post` — None
//! - `test_list_page_newest_first` — ordering, offset and limit
//! - `test_equal_timestamps_page_without_overlap` — ties never repeat across pages
//! - `test_count_ignores_window` — count is the full collection size
//! - `test_update_bumps_version` — update applies and increments version
//! - `test_stale_update_conflicts` — `VersionConflict`, stored post unchanged
//! - `test_update_unknown_post` — `NotFound`
//! - `test_delete_with_current_version` — post gone afterwards
//! - `test_stale_delete_conflicts` — `VersionConflict`, post kept
//! - `test_delete_unknown_post` — `NotFound`

/// Generate the store conformance suite.
///
/// Both factories are re-evaluated for each test. The user store must also
/// be `Clone + 'static` for the concurrent insert test.
#[macro_export]
macro_rules! store_contract_tests {
    (users: $users:expr, posts: $posts:expr) => {
        mod store_contract_tests {
            use super::*;
            use feed::core::store::{PostStore, UserStore};
            use feed::storage::StorageError;
            use uuid::Uuid;

            // ==================================================================
            // Users
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_find_user() {
                let users = $users;
                let email = unique_email("find");
                let user = users.insert(sample_user(&email)).await.unwrap();

                let by_id = users.find_by_id(&user.id).await.unwrap().unwrap();
                assert_eq!(by_id.email, email);
                assert_eq!(by_id.name, "Test User");
                assert!(by_id.posts.is_empty());

                let by_email = users.find_by_email(&email).await.unwrap().unwrap();
                assert_eq!(by_email.id, user.id);

                let other_case = users
                    .find_by_email(&email.to_uppercase())
                    .await
                    .unwrap();
                assert!(other_case.is_none(), "email lookup is exact");
            }

            #[tokio::test]
            async fn test_find_unknown_user() {
                let users = $users;
                assert!(users.find_by_id(&Uuid::new_v4()).await.unwrap().is_none());
                assert!(
                    users
                        .find_by_email("nobody@test.com")
                        .await
                        .unwrap()
                        .is_none()
                );
            }

            #[tokio::test]
            async fn test_duplicate_email_rejected() {
                let users = $users;
                let email = unique_email("dup");
                users.insert(sample_user(&email)).await.unwrap();

                let err = users.insert(sample_user(&email)).await.unwrap_err();
                assert!(
                    matches!(err, StorageError::DuplicateKey { .. }),
                    "unexpected error: {err:?}"
                );
            }

            #[tokio::test]
            async fn test_concurrent_duplicate_email() {
                let users = $users;
                let email = unique_email("race");

                let mut handles = Vec::new();
                for _ in 0..8 {
                    let users = users.clone();
                    let email = email.clone();
                    handles.push(tokio::spawn(async move {
                        users.insert(sample_user(&email)).await
                    }));
                }

                let mut created = 0;
                for handle in handles {
                    match handle.await.unwrap() {
                        Ok(_) => created += 1,
                        Err(StorageError::DuplicateKey { .. }) => {}
                        Err(e) => panic!("unexpected error: {e:?}"),
                    }
                }
                assert_eq!(created, 1);
            }

            #[tokio::test]
            async fn test_post_refs_add_and_remove() {
                let users = $users;
                let user = users.insert(sample_user(&unique_email("refs"))).await.unwrap();
                let first = Uuid::new_v4();
                let second = Uuid::new_v4();

                users.add_post_ref(&user.id, &first).await.unwrap();
                users.add_post_ref(&user.id, &second).await.unwrap();
                users.add_post_ref(&user.id, &first).await.unwrap();

                let stored = users.find_by_id(&user.id).await.unwrap().unwrap();
                assert_eq!(stored.posts, vec![first, second]);

                users.remove_post_ref(&user.id, &first).await.unwrap();
                let stored = users.find_by_id(&user.id).await.unwrap().unwrap();
                assert_eq!(stored.posts, vec![second]);
            }

            #[tokio::test]
            async fn test_post_refs_unknown_user() {
                let users = $users;
                let err = users
                    .add_post_ref(&Uuid::new_v4(), &Uuid::new_v4())
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::NotFound { .. }));

                let err = users
                    .remove_post_ref(&Uuid::new_v4(), &Uuid::new_v4())
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::NotFound { .. }));
            }

            // ==================================================================
            // Posts
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_get_post() {
                let posts = $posts;
                let creator = Uuid::new_v4();
                let post = posts.insert(sample_post(creator, "First post")).await.unwrap();

                let stored = posts.get(&post.id).await.unwrap().unwrap();
                assert_eq!(stored.title, "First post");
                assert_eq!(stored.content, "Some content");
                assert_eq!(stored.image_url.as_deref(), Some("images/sample.png"));
                assert_eq!(stored.creator, creator);
                assert_eq!(stored.version, 0);
                assert_eq!(
                    stored.created_at.timestamp_micros(),
                    post.created_at.timestamp_micros()
                );
            }

            #[tokio::test]
            async fn test_get_unknown_post() {
                let posts = $posts;
                assert!(posts.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_page_newest_first() {
                let posts = $posts;
                let creator = Uuid::new_v4();
                for (title, age) in [("oldest", 30), ("middle", 20), ("newest", 10)] {
                    posts.insert(aged_post(creator, title, age)).await.unwrap();
                }

                let titles = |page: Vec<feed::core::entity::Post>| {
                    page.into_iter().map(|p| p.title).collect::<Vec<_>>()
                };

                let first = posts.list_page(0, 2).await.unwrap();
                assert_eq!(titles(first), vec!["newest", "middle"]);

                let second = posts.list_page(2, 2).await.unwrap();
                assert_eq!(titles(second), vec!["oldest"]);

                let beyond = posts.list_page(10, 2).await.unwrap();
                assert!(beyond.is_empty());
            }

            #[tokio::test]
            async fn test_equal_timestamps_page_without_overlap() {
                let posts = $posts;
                let creator = Uuid::new_v4();
                let first = aged_post(creator, "first", 10);
                let at = first.created_at;
                posts.insert(first).await.unwrap();
                for title in ["second", "third"] {
                    let post = feed::core::entity::Post {
                        created_at: at,
                        updated_at: at,
                        ..sample_post(creator, title)
                    };
                    posts.insert(post).await.unwrap();
                }

                let mut seen = Vec::new();
                for offset in 0..3 {
                    let page = posts.list_page(offset, 1).await.unwrap();
                    assert_eq!(page.len(), 1);
                    seen.push(page[0].id);
                }
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), 3, "each post appears on exactly one page");
            }

            #[tokio::test]
            async fn test_count_ignores_window() {
                let posts = $posts;
                assert_eq!(posts.count().await.unwrap(), 0);

                let creator = Uuid::new_v4();
                for i in 0..5 {
                    posts
                        .insert(sample_post(creator, &format!("Post {i}")))
                        .await
                        .unwrap();
                }

                assert_eq!(posts.count().await.unwrap(), 5);
                assert_eq!(posts.list_page(0, 2).await.unwrap().len(), 2);
            }

            #[tokio::test]
            async fn test_update_bumps_version() {
                let posts = $posts;
                let post = posts
                    .insert(sample_post(Uuid::new_v4(), "Before"))
                    .await
                    .unwrap();

                let mut edited = post.clone();
                edited.title = "After".to_string();
                edited.image_url = None;
                let updated = posts.update(edited).await.unwrap();
                assert_eq!(updated.version, 1);

                let stored = posts.get(&post.id).await.unwrap().unwrap();
                assert_eq!(stored.title, "After");
                assert_eq!(stored.image_url, None);
                assert_eq!(stored.version, 1);
            }

            #[tokio::test]
            async fn test_stale_update_conflicts() {
                let posts = $posts;
                let post = posts
                    .insert(sample_post(Uuid::new_v4(), "Original"))
                    .await
                    .unwrap();

                let mut first = post.clone();
                first.title = "First writer".to_string();
                posts.update(first).await.unwrap();

                let mut second = post.clone();
                second.title = "Second writer".to_string();
                let err = posts.update(second).await.unwrap_err();
                assert!(
                    matches!(err, StorageError::VersionConflict { .. }),
                    "unexpected error: {err:?}"
                );

                let stored = posts.get(&post.id).await.unwrap().unwrap();
                assert_eq!(stored.title, "First writer");
            }

            #[tokio::test]
            async fn test_update_unknown_post() {
                let posts = $posts;
                let err = posts
                    .update(sample_post(Uuid::new_v4(), "Ghost"))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::NotFound { .. }));
            }

            #[tokio::test]
            async fn test_delete_with_current_version() {
                let posts = $posts;
                let post = posts
                    .insert(sample_post(Uuid::new_v4(), "Doomed"))
                    .await
                    .unwrap();

                posts.delete(&post.id, post.version).await.unwrap();
                assert!(posts.get(&post.id).await.unwrap().is_none());
                assert_eq!(posts.count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_stale_delete_conflicts() {
                let posts = $posts;
                let post = posts
                    .insert(sample_post(Uuid::new_v4(), "Edited"))
                    .await
                    .unwrap();
                posts.update(post.clone()).await.unwrap();

                let err = posts.delete(&post.id, post.version).await.unwrap_err();
                assert!(matches!(err, StorageError::VersionConflict { .. }));
                assert!(posts.get(&post.id).await.unwrap().is_some());
            }

            #[tokio::test]
            async fn test_delete_unknown_post() {
                let posts = $posts;
                let err = posts.delete(&Uuid::new_v4(), 0).await.unwrap_err();
                assert!(matches!(err, StorageError::NotFound { .. }));
            }
        }
    };
}
