//! Server host for transport-agnostic API exposure
//!
//! The host holds everything a transport needs to serve requests: the feed
//! service, the auth provider and the configuration. Both the GraphQL and
//! REST exposures are built from the same `Arc<ServerHost>`.

use crate::config::FeedConfig;
use crate::core::auth::AuthProvider;
use crate::core::service::FeedService;
use std::sync::Arc;

/// Host context shared by every exposure
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::new(config, service, auth));
/// let graphql_app = GraphQLExposure::build_router(host.clone());
/// let rest_app = RestExposure::build_router(host);
/// ```
pub struct ServerHost {
    /// Validated configuration
    pub config: Arc<FeedConfig>,

    /// Feed operations
    pub service: Arc<FeedService>,

    /// Resolves the identity of each request
    pub auth: Arc<dyn AuthProvider>,
}

impl ServerHost {
    pub fn new(config: FeedConfig, service: FeedService, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            auth,
        }
    }

    pub fn service(&self) -> &FeedService {
        &self.service
    }
}
