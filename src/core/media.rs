//! Image storage
//!
//! Images are referenced from posts as `images/<file name>`, the same path
//! they are served under.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// URL prefix of every stored image
pub const IMAGE_ROUTE_PREFIX: &str = "images/";

/// Content types accepted for upload
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg"];

pub fn is_accepted_image_type(content_type: &str) -> bool {
    ACCEPTED_IMAGE_TYPES.contains(&content_type)
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the bytes under a fresh name derived from `original_name`,
    /// returning the reference to save on a post
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String>;

    /// Delete the image behind a reference
    async fn remove(&self, reference: &str) -> Result<()>;
}

/// Images kept in a local directory
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a reference to a file inside the directory
    ///
    /// Only the final path component is used, so a reference can never
    /// point outside the directory.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let name = reference
            .strip_prefix(IMAGE_ROUTE_PREFIX)
            .ok_or_else(|| anyhow!("'{}' is not a stored image", reference))?;
        let name = Path::new(name)
            .file_name()
            .ok_or_else(|| anyhow!("'{}' has no file name", reference))?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(original_name));
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(format!("{}{}", IMAGE_ROUTE_PREFIX, name))
    }

    async fn remove(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("failed to remove {}", path.display()))
    }
}

/// Remove an image, logging instead of failing
pub async fn release_image(images: &Arc<dyn ImageStore>, reference: &str) {
    if let Err(e) = images.remove(reference).await {
        tracing::warn!(image = %reference, error = %e, "failed to release image");
    }
}

/// Reduce an uploaded file name to a safe single path component
pub fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect();

    let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');
    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized.to_string()
    }
}
