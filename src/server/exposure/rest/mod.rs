//! REST API exposure
//!
//! Health checks, image upload and static serving of stored images. Posts
//! only ever reference images by the path returned from the upload.

use super::super::host::ServerHost;
use crate::core::auth::AuthContext;
use crate::core::error::FeedError;
use crate::core::media::is_accepted_image_type;
use axum::{
    Json, Router,
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Multipart field carrying the upload
const IMAGE_FIELD: &str = "image";

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        let images_dir = host.config.images.dir.clone();

        Self::health_routes()
            .route("/post-image", post(Self::upload_image))
            .nest_service("/images", ServeDir::new(images_dir))
            .layer(Extension(host))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "feed-rs"
        }))
    }

    /// Store the `image` part of a multipart body
    ///
    /// Files of any other content type are dropped, as if nothing had been
    /// sent.
    async fn upload_image(
        Extension(host): Extension<Arc<ServerHost>>,
        ctx: AuthContext,
        mut multipart: Multipart,
    ) -> Result<Response, FeedError> {
        let user_id = ctx.require_user()?;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            FeedError::bad_request(format!(
                "Error parsing `multipart/form-data` request: {}",
                e.body_text()
            ))
        })? {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }

            let accepted = field.content_type().is_some_and(is_accepted_image_type);
            if !accepted {
                tracing::debug!(content_type = ?field.content_type(), "upload filtered out");
                continue;
            }

            let original_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(|e| {
                FeedError::bad_request(format!("Failed to read upload: {}", e.body_text()))
            })?;

            let file_path = host.service().images().store(&original_name, &bytes).await?;
            tracing::info!(user_id = %user_id, image = %file_path, "image stored");

            return Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "File stored.", "filePath": file_path })),
            )
                .into_response());
        }

        Ok(Json(json!({ "message": "No file provided!" })).into_response())
    }
}
