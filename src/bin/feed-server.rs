//! Feed API server
//!
//! Configuration comes from the YAML file named by `FEED_CONFIG` (or the
//! defaults), overridden by `FEED_BIND_ADDR`, `FEED_SIGNING_KEY` and
//! `FEED_MONGODB_URI`. Log filtering follows `RUST_LOG`.

use feed::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("feed=info,tower_http=info")),
        )
        .init();

    let config = FeedConfig::load()?;
    tracing::info!(backend = ?config.storage.backend, "starting feed server");

    let builder = ServerBuilder::new(config.clone());
    let builder = match config.storage.backend {
        StorageBackend::InMemory => builder
            .with_user_store(InMemoryUserStore::default())
            .with_post_store(InMemoryPostStore::default()),
        StorageBackend::Mongodb => with_mongodb(builder, &config).await?,
    };

    builder.serve().await
}

#[cfg(feature = "mongodb_backend")]
async fn with_mongodb(builder: ServerBuilder, config: &FeedConfig) -> Result<ServerBuilder> {
    let (users, posts) = feed::storage::mongodb::connect(&config.storage).await?;
    Ok(builder.with_user_store(users).with_post_store(posts))
}

#[cfg(not(feature = "mongodb_backend"))]
async fn with_mongodb(_builder: ServerBuilder, _config: &FeedConfig) -> Result<ServerBuilder> {
    anyhow::bail!("MongoDB support is not enabled. Enable the 'mongodb_backend' feature to use it.")
}
