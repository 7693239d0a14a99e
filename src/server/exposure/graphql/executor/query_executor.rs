//! Query execution for GraphQL

use graphql_parser::query::Field;
use serde_json::Value;

use super::utils::{self, Variables};
use crate::core::auth::AuthContext;
use crate::core::error::{FeedError, GraphQLError};
use crate::server::host::ServerHost;

/// Resolve a query root field (`login`, `posts`, `post`) to rendered JSON
pub async fn resolve_query_field(
    host: &ServerHost,
    ctx: &AuthContext,
    field: &Field<'_, String>,
    variables: &Variables,
) -> Result<Value, FeedError> {
    let service = host.service();

    match field.name.as_str() {
        "login" => {
            let email = utils::required_string(field, "email", variables)?;
            let password = utils::required_string(field, "password", variables)?;
            let auth = service.login(&email, &password).await?;
            Ok(serde_json::to_value(auth)?)
        }
        "posts" => {
            let page = utils::optional_int(field, "page", variables)?;
            let page = service.posts(ctx, page).await?;
            Ok(serde_json::to_value(page)?)
        }
        "post" => {
            let id = utils::required_string(field, "id", variables)?;
            let post = service.post(ctx, &id).await?;
            Ok(serde_json::to_value(post)?)
        }
        other => Err(GraphQLError::UnknownField {
            operation: "RootQuery".to_string(),
            field: other.to_string(),
        }
        .into()),
    }
}
