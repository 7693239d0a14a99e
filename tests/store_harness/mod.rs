//! Shared test harness for store backend testing
//!
//! Provides entity builders and the `store_contract_tests!` macro that every
//! `UserStore`/`PostStore` pair is checked against.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
mod store_contract_tests;

use chrono::{Duration, Utc};
use feed::core::entity::{Post, User};
use uuid::Uuid;

/// A user with a placeholder hash; stores never inspect it.
pub fn sample_user(email: &str) -> User {
    User::new(
        "Test User".to_string(),
        email.to_string(),
        "$2b$04$placeholderplaceholderplaceholderplaceholderpla".to_string(),
    )
}

/// A post by `creator`
pub fn sample_post(creator: Uuid, title: &str) -> Post {
    Post::new(
        title.to_string(),
        "Some content".to_string(),
        Some("images/sample.png".to_string()),
        creator,
    )
}

/// A post created `seconds_ago` seconds in the past, for ordering checks
pub fn aged_post(creator: Uuid, title: &str, seconds_ago: i64) -> Post {
    let at = Utc::now() - Duration::seconds(seconds_ago);
    Post {
        created_at: at,
        updated_at: at,
        ..sample_post(creator, title)
    }
}

/// Unique email for tests sharing a backend
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@test.com", prefix, Uuid::new_v4().simple())
}
