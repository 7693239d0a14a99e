//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::{GraphQLExposure, RestExposure};
use super::host::ServerHost;
use super::middleware::auth_gate;
use crate::config::FeedConfig;
use crate::core::auth::{AuthProvider, JwtAuthProvider};
use crate::core::media::{ImageStore, LocalImageStore};
use crate::core::service::FeedService;
use crate::core::store::{PostStore, UserStore};
use crate::core::token::TokenIssuer;
use anyhow::Result;
use axum::Router;
use axum::http::{Method, header};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the feed HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(config)
///     .with_user_store(InMemoryUserStore::default())
///     .with_post_store(InMemoryPostStore::default())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: FeedConfig,
    users: Option<Arc<dyn UserStore>>,
    posts: Option<Arc<dyn PostStore>>,
    images: Option<Arc<dyn ImageStore>>,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl ServerBuilder {
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            users: None,
            posts: None,
            images: None,
            auth: None,
        }
    }

    /// Set the user store (required)
    pub fn with_user_store(mut self, store: impl UserStore + 'static) -> Self {
        self.users = Some(Arc::new(store));
        self
    }

    /// Set the post store (required)
    pub fn with_post_store(mut self, store: impl PostStore + 'static) -> Self {
        self.posts = Some(Arc::new(store));
        self
    }

    /// Override the image store (defaults to `images.dir` on local disk)
    pub fn with_image_store(mut self, store: impl ImageStore + 'static) -> Self {
        self.images = Some(Arc::new(store));
        self
    }

    /// Override the auth provider (defaults to bearer tokens signed with
    /// `auth.signing_key`)
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        self.config.validate()?;

        let users = self
            .users
            .ok_or_else(|| anyhow::anyhow!("UserStore is required. Call .with_user_store()"))?;
        let posts = self
            .posts
            .ok_or_else(|| anyhow::anyhow!("PostStore is required. Call .with_post_store()"))?;
        let images = self
            .images
            .unwrap_or_else(|| Arc::new(LocalImageStore::new(self.config.images.dir.clone())));
        let auth = self.auth.unwrap_or_else(|| {
            Arc::new(JwtAuthProvider::new(TokenIssuer::from_config(
                &self.config.auth,
            )))
        });

        let service = FeedService::from_config(&self.config, users, posts, images);
        Ok(ServerHost::new(self.config, service, auth))
    }

    /// Build the final router: GraphQL, REST, auth gate, CORS and tracing
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        Ok(Self::router_for(host))
    }

    /// Assemble the router for an existing host
    pub fn router_for(host: Arc<ServerHost>) -> Router {
        GraphQLExposure::build_router(host.clone())
            .merge(RestExposure::build_router(host.clone()))
            .layer(axum::middleware::from_fn_with_state(host, auth_gate))
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `server.bind_addr` and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind_addr.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Any origin; preflight requests are answered by the layer itself
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
