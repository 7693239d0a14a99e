//! Feed operations
//!
//! [`FeedService`] is the single entry point for every query and mutation.
//! Each operation receives the caller's [`AuthContext`], checks it, validates
//! its input and talks to the stores. Transports (GraphQL, REST) only decode
//! arguments and render the results.

use crate::config::FeedConfig;
use crate::core::auth::AuthContext;
use crate::core::entity::{Post, User};
use crate::core::error::FeedError;
use crate::core::media::{ImageStore, release_image};
use crate::core::password::PasswordHasher;
use crate::core::store::{PostStore, UserStore};
use crate::core::token::TokenIssuer;
use crate::core::validation::{Validator, email, min_length, not_empty};
use crate::core::view::{AuthData, PostPage, PostView, UserView};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Image value clients send when they keep the current image
const UNCHANGED_IMAGE: &str = "undefined";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PostInput {
    fn validate(&self) -> Result<(), FeedError> {
        let mut validator = Validator::new();
        validator
            .field("title", &self.title)
            .rule(not_empty())
            .rule(min_length(5));
        validator
            .field("content", &self.content)
            .rule(not_empty())
            .rule(min_length(5));
        validator.finish()?;
        Ok(())
    }

    /// Image reference to apply on update, if any
    fn replacement_image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .filter(|url| *url != UNCHANGED_IMAGE)
    }
}

/// Everything an operation needs, shared across requests
#[derive(Clone)]
pub struct FeedService {
    users: Arc<dyn UserStore>,
    posts: Arc<dyn PostStore>,
    images: Arc<dyn ImageStore>,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
    page_size: usize,
}

impl FeedService {
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        images: Arc<dyn ImageStore>,
        tokens: TokenIssuer,
        hasher: PasswordHasher,
        page_size: usize,
    ) -> Self {
        Self {
            users,
            posts,
            images,
            tokens,
            hasher,
            page_size,
        }
    }

    /// Wire the service from configuration and ready-made stores
    pub fn from_config(
        config: &FeedConfig,
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self::new(
            users,
            posts,
            images,
            TokenIssuer::from_config(&config.auth),
            PasswordHasher::new(config.auth.bcrypt_cost),
            config.feed.page_size,
        )
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn images(&self) -> &Arc<dyn ImageStore> {
        &self.images
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // === Users ===

    /// Register a new user
    pub async fn create_user(&self, input: UserInput) -> Result<UserView, FeedError> {
        let mut validator = Validator::new();
        validator
            .field("name", &input.name)
            .rule(not_empty())
            .rule(min_length(5));
        validator
            .field("email", &input.email)
            .rule(not_empty())
            .rule(email());
        validator
            .field("password", &input.password)
            .rule(not_empty())
            .rule(min_length(5));
        validator.finish()?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(FeedError::conflict("user", "User exists already"));
        }

        let password_hash = self.hasher.hash(&input.password).await?;
        // A concurrent registration is caught by the store's uniqueness check
        let user = self
            .users
            .insert(User::new(input.name, input.email, password_hash))
            .await?;

        info!(user_id = %user.id, "user created");
        Ok(UserView::from(&user))
    }

    /// Exchange credentials for a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthData, FeedError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| FeedError::unauthenticated_with("E-mail address does not exist"))?;

        if !self.hasher.verify(password, &user.password_hash).await? {
            debug!(user_id = %user.id, "login rejected");
            return Err(FeedError::unauthenticated_with("Invalid password"));
        }

        let user_id = user.id.to_string();
        let token = self.tokens.issue(&user_id, &user.email)?;

        info!(user_id = %user.id, "user logged in");
        Ok(AuthData { user_id, token })
    }

    // === Posts ===

    pub async fn create_post(
        &self,
        ctx: &AuthContext,
        input: PostInput,
    ) -> Result<PostView, FeedError> {
        let caller = ctx.require_user()?;
        input.validate()?;

        let user = self
            .users
            .find_by_id(&caller)
            .await?
            .ok_or_else(|| FeedError::unauthenticated_with("Invalid user."))?;

        let post = self
            .posts
            .insert(Post::new(
                input.title,
                input.content,
                input.image_url,
                user.id,
            ))
            .await?;
        if let Err(e) = self.users.add_post_ref(&user.id, &post.id).await {
            // Unreferenced posts must not stay in the feed
            if let Err(undo) = self.posts.delete(&post.id, post.version).await {
                error!(post_id = %post.id, error = %undo, "failed to remove unreferenced post");
            }
            return Err(e.into());
        }

        info!(post_id = %post.id, user_id = %user.id, "post created");

        let creator = self.users.find_by_id(&user.id).await?.unwrap_or(user);
        Ok(PostView::new(&post, Some(&creator)))
    }

    /// One page of the feed, newest first
    ///
    /// Pages start at 1; a missing or non-positive page means the first.
    pub async fn posts(&self, ctx: &AuthContext, page: Option<i64>) -> Result<PostPage, FeedError> {
        ctx.require_user()?;

        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let offset = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(self.page_size);

        let total_posts = self.posts.count().await?;
        let posts = self.posts.list_page(offset, self.page_size).await?;

        let mut creators: HashMap<Uuid, Option<User>> = HashMap::new();
        let mut views = Vec::with_capacity(posts.len());
        for post in &posts {
            if !creators.contains_key(&post.creator) {
                let creator = self.users.find_by_id(&post.creator).await?;
                creators.insert(post.creator, creator);
            }
            let creator = creators.get(&post.creator).and_then(Option::as_ref);
            views.push(PostView::new(post, creator));
        }

        Ok(PostPage {
            posts: views,
            total_posts,
        })
    }

    pub async fn post(&self, ctx: &AuthContext, id: &str) -> Result<PostView, FeedError> {
        ctx.require_user()?;

        let post = self.find_post(id).await?;
        self.render(&post).await
    }

    /// Edit a post owned by the caller
    pub async fn update_post(
        &self,
        ctx: &AuthContext,
        id: &str,
        input: PostInput,
    ) -> Result<PostView, FeedError> {
        let caller = ctx.require_user()?;

        let mut post = self.find_post(id).await?;
        if !post.is_created_by(caller) {
            return Err(FeedError::forbidden());
        }
        input.validate()?;

        let previous_image = post.image_url.clone();
        if let Some(image) = input.replacement_image() {
            post.image_url = Some(image.to_string());
        }
        post.title = input.title;
        post.content = input.content;
        post.updated_at = Utc::now();

        let post = self.posts.update(post).await?;
        info!(post_id = %post.id, user_id = %caller, "post updated");

        if let Some(previous) = previous_image {
            if post.image_url.as_deref() != Some(previous.as_str()) {
                release_image(&self.images, &previous).await;
            }
        }

        self.render(&post).await
    }

    /// Delete a post owned by the caller, with its image and owner reference
    pub async fn delete_post(&self, ctx: &AuthContext, id: &str) -> Result<bool, FeedError> {
        let caller = ctx.require_user()?;

        let post = self.find_post(id).await?;
        if !post.is_created_by(caller) {
            return Err(FeedError::forbidden());
        }

        self.posts.delete(&post.id, post.version).await?;
        if let Err(e) = self.users.remove_post_ref(&post.creator, &post.id).await {
            warn!(
                post_id = %post.id,
                user_id = %post.creator,
                error = %e,
                "post deleted but owner still references it"
            );
        }
        if let Some(image) = &post.image_url {
            release_image(&self.images, image).await;
        }

        info!(post_id = %post.id, user_id = %caller, "post deleted");
        Ok(true)
    }

    // === Helpers ===

    /// Load a post by its textual id; unparsable ids are simply not found
    async fn find_post(&self, id: &str) -> Result<Post, FeedError> {
        let not_found = || FeedError::not_found("post", id);
        let post_id = Uuid::parse_str(id).map_err(|_| not_found())?;
        self.posts.get(&post_id).await?.ok_or_else(not_found)
    }

    async fn render(&self, post: &Post) -> Result<PostView, FeedError> {
        let creator = self.users.find_by_id(&post.creator).await?;
        Ok(PostView::new(post, creator.as_ref()))
    }
}
