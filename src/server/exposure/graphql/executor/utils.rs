//! Utility functions for GraphQL execution

use crate::core::error::{FeedError, GraphQLError};
use graphql_parser::query::{Field, Value as GqlValue};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

/// Variables of the operation being executed, defaults already applied
pub type Variables = Map<String, Value>;

/// Convert GraphQL value to JSON, substituting variables
pub fn gql_value_to_json(value: &GqlValue<String>, variables: &Variables) -> Value {
    match value {
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => json!(i.as_i64().unwrap_or(0)),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(
            list.iter()
                .map(|v| gql_value_to_json(v, variables))
                .collect(),
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), gql_value_to_json(v, variables));
            }
            Value::Object(map)
        }
        GqlValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
    }
}

/// Get an argument as JSON; an explicit `null` counts as absent
pub fn get_arg(field: &Field<String>, arg_name: &str, variables: &Variables) -> Option<Value> {
    field
        .arguments
        .iter()
        .find(|(name, _)| name.as_str() == arg_name)
        .map(|(_, value)| gql_value_to_json(value, variables))
        .filter(|value| !value.is_null())
}

fn missing(field: &Field<String>, arg_name: &str) -> FeedError {
    GraphQLError::MissingArgument {
        field: field.name.clone(),
        argument: arg_name.to_string(),
    }
    .into()
}

fn invalid(arg_name: &str, message: impl Into<String>) -> FeedError {
    GraphQLError::InvalidArgument {
        argument: arg_name.to_string(),
        message: message.into(),
    }
    .into()
}

/// Get a required string (or ID) argument
pub fn required_string(
    field: &Field<String>,
    arg_name: &str,
    variables: &Variables,
) -> Result<String, FeedError> {
    match get_arg(field, arg_name, variables) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(arg_name, "expected a string")),
        None => Err(missing(field, arg_name)),
    }
}

/// Get an optional int argument
pub fn optional_int(
    field: &Field<String>,
    arg_name: &str,
    variables: &Variables,
) -> Result<Option<i64>, FeedError> {
    match get_arg(field, arg_name, variables) {
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(arg_name, "expected an integer")),
        None => Ok(None),
    }
}

/// Deserialize a required input-object argument
pub fn required_input<T: DeserializeOwned>(
    field: &Field<String>,
    arg_name: &str,
    variables: &Variables,
) -> Result<T, FeedError> {
    let value = get_arg(field, arg_name, variables).ok_or_else(|| missing(field, arg_name))?;
    serde_json::from_value(value).map_err(|e| invalid(arg_name, e.to_string()))
}
