//! Core GraphQL executor orchestration

use graphql_parser::query::{
    Definition, Field, OperationDefinition, SelectionSet, VariableDefinition, parse_query,
};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use super::field_resolver::{self, Fragments};
use super::mutation_executor;
use super::query_executor;
use super::utils::{self, Variables};
use crate::core::auth::AuthContext;
use crate::core::error::{FeedError, GraphQLError};
use crate::server::exposure::graphql::schema::{MUTATION_FIELDS, QUERY_FIELDS};
use crate::server::host::ServerHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    fn type_name(self) -> &'static str {
        match self {
            OperationKind::Query => "RootQuery",
            OperationKind::Mutation => "RootMutation",
        }
    }

    fn root_fields(self) -> &'static [&'static str] {
        match self {
            OperationKind::Query => QUERY_FIELDS,
            OperationKind::Mutation => MUTATION_FIELDS,
        }
    }
}

/// GraphQL executor over the feed operations
///
/// Document-level problems (parse errors, unknown root fields, ambiguous
/// operations) fail the whole request. Once execution starts, each root field
/// resolves on its own: a failing field becomes `null` in `data` and an entry
/// in `errors`.
pub struct GraphQLExecutor {
    host: Arc<ServerHost>,
}

impl GraphQLExecutor {
    pub fn new(host: Arc<ServerHost>) -> Self {
        Self { host }
    }

    /// Execute a GraphQL document and return `{ data, errors? }`
    pub async fn execute(
        &self,
        ctx: &AuthContext,
        query: &str,
        variables: Option<Variables>,
        operation_name: Option<&str>,
    ) -> Result<Value, GraphQLError> {
        let doc = parse_query::<String>(query).map_err(|e| GraphQLError::ParseError {
            message: e.to_string(),
        })?;

        let mut fragments = Fragments::new();
        let mut operations = Vec::new();
        for definition in &doc.definitions {
            match definition {
                Definition::Operation(op) => operations.push(op),
                Definition::Fragment(fragment) => {
                    fragments.insert(fragment.name.as_str(), fragment);
                }
            }
        }

        if let Some(name) = field_resolver::find_fragment_cycle(&fragments) {
            return Err(GraphQLError::InvalidOperation {
                message: format!("Fragment '{}' spreads itself", name),
            });
        }

        let operation = select_operation(&operations, operation_name)?;
        let (kind, selection_set, definitions) = match operation {
            OperationDefinition::Query(q) => {
                (OperationKind::Query, &q.selection_set, &q.variable_definitions[..])
            }
            OperationDefinition::Mutation(m) => (
                OperationKind::Mutation,
                &m.selection_set,
                &m.variable_definitions[..],
            ),
            OperationDefinition::SelectionSet(s) => (OperationKind::Query, s, &[][..]),
            OperationDefinition::Subscription(_) => {
                return Err(GraphQLError::InvalidOperation {
                    message: "Subscriptions are not supported".to_string(),
                });
            }
        };

        let variables = with_defaults(definitions, variables.unwrap_or_default());
        self.execute_operation(ctx, kind, selection_set, &fragments, &variables)
            .await
    }

    async fn execute_operation<'a, 'd>(
        &self,
        ctx: &AuthContext,
        kind: OperationKind,
        selection_set: &'a SelectionSet<'d, String>,
        fragments: &Fragments<'a, 'd>,
        variables: &Variables,
    ) -> Result<Value, GraphQLError> {
        let mut fields = Vec::new();
        field_resolver::collect_fields(&selection_set.items, fragments, &mut fields);

        for field in &fields {
            let name = field.name.as_str();
            if name != "__typename" && !kind.root_fields().contains(&name) {
                return Err(GraphQLError::UnknownField {
                    operation: kind.type_name().to_string(),
                    field: name.to_string(),
                });
            }
        }

        let mut data = Map::new();
        let mut errors = Vec::new();

        // Root fields run one after another, mutations in document order
        for field in fields {
            let key = field.alias.as_ref().unwrap_or(&field.name).clone();

            if field.name == "__typename" {
                data.insert(key, json!(kind.type_name()));
                continue;
            }

            match self.resolve_root_field(ctx, kind, field, variables).await {
                Ok(value) => {
                    let projected =
                        field_resolver::project(&value, &field.selection_set.items, fragments);
                    data.insert(key, projected);
                }
                Err(e) => {
                    log_field_error(&field.name, &e);
                    errors.push(error_entry(&e, &key));
                    data.insert(key, Value::Null);
                }
            }
        }

        let mut response = json!({ "data": data });
        if !errors.is_empty() {
            response["errors"] = Value::Array(errors);
        }
        Ok(response)
    }

    async fn resolve_root_field(
        &self,
        ctx: &AuthContext,
        kind: OperationKind,
        field: &Field<'_, String>,
        variables: &Variables,
    ) -> Result<Value, FeedError> {
        match kind {
            OperationKind::Query => {
                query_executor::resolve_query_field(&self.host, ctx, field, variables).await
            }
            OperationKind::Mutation => {
                mutation_executor::resolve_mutation_field(&self.host, ctx, field, variables).await
            }
        }
    }
}

/// Pick the operation to run: the named one, or the only one
fn select_operation<'a, 'd>(
    operations: &[&'a OperationDefinition<'d, String>],
    operation_name: Option<&str>,
) -> Result<&'a OperationDefinition<'d, String>, GraphQLError> {
    let invalid = |message: &str| GraphQLError::InvalidOperation {
        message: message.to_string(),
    };

    match operation_name {
        Some(wanted) => operations
            .iter()
            .copied()
            .find(|op| operation_name_of(op) == Some(wanted))
            .ok_or_else(|| GraphQLError::InvalidOperation {
                message: format!("Unknown operation named '{}'", wanted),
            }),
        None => match operations {
            [] => Err(invalid("No operation found in query")),
            [only] => Ok(*only),
            _ => Err(invalid(
                "Must provide operation name if query contains multiple operations",
            )),
        },
    }
}

fn operation_name_of<'a>(op: &'a OperationDefinition<'_, String>) -> Option<&'a str> {
    match op {
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
        OperationDefinition::SelectionSet(_) => None,
    }
}

/// Fill in declared defaults for variables the client did not send
fn with_defaults(definitions: &[VariableDefinition<'_, String>], mut variables: Variables) -> Variables {
    for definition in definitions {
        if variables.contains_key(&definition.name) {
            continue;
        }
        if let Some(default) = &definition.default_value {
            let value = utils::gql_value_to_json(default, &Variables::new());
            variables.insert(definition.name.clone(), value);
        }
    }
    variables
}

/// `{ status, message, data?, path }` for one failed root field
fn error_entry(err: &FeedError, key: &str) -> Value {
    let response = err.to_response();
    let mut entry = json!({
        "status": response.status,
        "message": response.message,
        "path": [key],
    });
    if let Some(violations) = response.data {
        entry["data"] = json!(violations);
    }
    entry
}

fn log_field_error(field: &str, err: &FeedError) {
    if err.status_code().is_server_error() {
        tracing::error!(field = %field, code = err.error_code(), "{}", err);
    } else {
        tracing::debug!(field = %field, code = err.error_code(), "{}", err);
    }
}
