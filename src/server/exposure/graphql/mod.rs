//! GraphQL API exposure
//!
//! `POST /graphql` executes a document against the feed operations and
//! `GET /graphql/schema` returns the SDL.

mod executor;
mod schema;

pub use executor::Variables;
pub use schema::SCHEMA_SDL;

use crate::core::auth::AuthContext;
use crate::core::error::FeedError;
use crate::server::host::ServerHost;
use axum::{
    Router,
    extract::{Extension, Json},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use executor::GraphQLExecutor;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequestBody {
    query: String,
    #[serde(default)]
    variables: Option<Variables>,
    #[serde(default)]
    operation_name: Option<String>,
}

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        Router::new()
            .route("/graphql", post(graphql_handler))
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(host))
    }
}

/// Handler for GraphQL queries and mutations
///
/// Resolver failures are reported inside a 200 response; a document that
/// cannot be executed at all is a 400 with `data: null`.
async fn graphql_handler(
    Extension(host): Extension<Arc<ServerHost>>,
    ctx: AuthContext,
    Json(request): Json<GraphQLRequestBody>,
) -> Response {
    let executor = GraphQLExecutor::new(host);

    match executor
        .execute(
            &ctx,
            &request.query,
            request.variables,
            request.operation_name.as_deref(),
        )
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            let err = FeedError::from(e);
            tracing::debug!(code = err.error_code(), "{}", err);
            let body = json!({
                "data": null,
                "errors": [err.to_response()],
            });
            (err.status_code(), Json(body)).into_response()
        }
    }
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        SCHEMA_SDL,
    )
}
