//! Mutation execution for GraphQL

use graphql_parser::query::Field;
use serde_json::Value;

use super::utils::{self, Variables};
use crate::core::auth::AuthContext;
use crate::core::error::{FeedError, GraphQLError};
use crate::core::service::{PostInput, UserInput};
use crate::server::host::ServerHost;

/// Resolve a mutation root field to rendered JSON
pub async fn resolve_mutation_field(
    host: &ServerHost,
    ctx: &AuthContext,
    field: &Field<'_, String>,
    variables: &Variables,
) -> Result<Value, FeedError> {
    let service = host.service();

    match field.name.as_str() {
        "createUser" => {
            let input: UserInput = utils::required_input(field, "userInput", variables)?;
            let user = service.create_user(input).await?;
            Ok(serde_json::to_value(user)?)
        }
        "createPost" => {
            let input: PostInput = utils::required_input(field, "postInput", variables)?;
            let post = service.create_post(ctx, input).await?;
            Ok(serde_json::to_value(post)?)
        }
        "updatePost" => {
            let id = utils::required_string(field, "id", variables)?;
            let input: PostInput = utils::required_input(field, "postInput", variables)?;
            let post = service.update_post(ctx, &id, input).await?;
            Ok(serde_json::to_value(post)?)
        }
        "deletePost" => {
            let id = utils::required_string(field, "id", variables)?;
            let deleted = service.delete_post(ctx, &id).await?;
            Ok(Value::Bool(deleted))
        }
        other => Err(GraphQLError::UnknownField {
            operation: "RootMutation".to_string(),
            field: other.to_string(),
        }
        .into()),
    }
}
