//! Wire shapes returned by the feed operations

use crate::core::entity::{Post, User};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A reference to a post inside a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRef {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Never populated
    pub password: Option<String>,
    pub posts: Vec<PostRef>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: None,
            posts: user
                .posts
                .iter()
                .map(|id| PostRef { id: id.to_string() })
                .collect(),
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    /// Populated creator; `None` only if the creator record is gone
    pub creator: Option<UserView>,
    pub created_at: String,
    pub updated_at: String,
}

impl PostView {
    pub fn new(post: &Post, creator: Option<&User>) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            creator: creator.map(UserView::from),
            created_at: format_timestamp(&post.created_at),
            updated_at: format_timestamp(&post.updated_at),
        }
    }

    pub fn post_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.id).ok()
    }
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user_id: String,
    pub token: String,
}

/// One page of the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostView>,
    /// Size of the whole collection, not of this page
    pub total_posts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-01T12:30:05.000Z");
    }

    #[test]
    fn test_user_view_hides_password() {
        let mut user = User::new("Alice".into(), "alice@test.com".into(), "$2b$hash".into());
        let post_id = Uuid::new_v4();
        user.posts.push(post_id);

        let json = serde_json::to_value(UserView::from(&user)).unwrap();
        assert_eq!(json["_id"], user.id.to_string());
        assert!(json["password"].is_null());
        assert_eq!(json["posts"][0]["_id"], post_id.to_string());
        assert!(json.get("passwordHash").is_none());
        assert!(json["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_post_view_shape() {
        let user = User::new("Alice".into(), "alice@test.com".into(), "h".into());
        let post = Post::new(
            "Title".into(),
            "Content".into(),
            Some("images/a.png".into()),
            user.id,
        );

        let view = PostView::new(&post, Some(&user));
        assert_eq!(view.post_id(), Some(post.id));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["imageUrl"], "images/a.png");
        assert_eq!(json["creator"]["name"], "Alice");
        assert!(json.get("version").is_none());
    }

    #[test]
    fn test_page_uses_camel_case() {
        let page = PostPage {
            posts: vec![],
            total_posts: 5,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPosts"], 5);
    }
}
