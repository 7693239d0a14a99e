//! Typed error handling for the feed API
//!
//! Every operation returns a [`FeedError`]. The error knows its HTTP-equivalent
//! status and how to render itself as the wire shape
//! `{ status, message, data? }`, where `data` carries the collected
//! violations of a failed validation and nothing otherwise.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: one or more input rules failed (422)
//! - [`RequestError`]: malformed bodies (400), unauthenticated callers (401)
//!   and callers without access (403)
//! - [`EntityError`]: missing resources (404) and conflicts (409)
//! - [`StorageError`]: backend failures (500)
//! - [`GraphQLError`]: malformed documents and unknown operations
//!
//! # Example
//!
//! ```rust,ignore
//! use feed::core::error::{EntityError, FeedError};
//!
//! match service.post(&ctx, "42").await {
//!     Ok(post) => println!("{}", post.title),
//!     Err(FeedError::Entity(EntityError::NotFound { .. })) => println!("gone"),
//!     Err(e) => eprintln!("{} ({})", e, e.status_code()),
//! }
//! ```

use crate::storage::error::StorageError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the feed API
#[derive(Debug)]
pub enum FeedError {
    /// Input failed one or more validation rules
    Validation(ValidationError),

    /// Authentication and authorization failures
    Request(RequestError),

    /// Missing or conflicting entities
    Entity(EntityError),

    /// Storage backend errors
    Storage(StorageError),

    /// GraphQL document errors
    GraphQL(GraphQLError),

    /// Anything else (should not happen in normal operation)
    Internal(String),
}

impl FeedError {
    /// `Unauthenticated` with the default message
    pub fn unauthenticated() -> Self {
        Self::unauthenticated_with("Not authenticated!")
    }

    pub fn unauthenticated_with(message: impl Into<String>) -> Self {
        FeedError::Request(RequestError::Unauthenticated {
            message: message.into(),
        })
    }

    /// `Forbidden` with the default message
    pub fn forbidden() -> Self {
        FeedError::Request(RequestError::Forbidden {
            message: "Not authorized!".to_string(),
        })
    }

    /// Request body the server cannot decode
    pub fn bad_request(message: impl Into<String>) -> Self {
        FeedError::Request(RequestError::BadRequest {
            message: message.into(),
        })
    }

    pub fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        FeedError::Entity(EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        })
    }

    pub fn conflict(entity_type: &str, message: impl Into<String>) -> Self {
        FeedError::Entity(EntityError::AlreadyExists {
            entity_type: entity_type.to_string(),
            message: message.into(),
        })
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Validation(e) => write!(f, "{}", e),
            FeedError::Request(e) => write!(f, "{}", e),
            FeedError::Entity(e) => write!(f, "{}", e),
            FeedError::Storage(e) => write!(f, "{}", e),
            FeedError::GraphQL(e) => write!(f, "{}", e),
            FeedError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Validation(e) => Some(e),
            FeedError::Request(e) => Some(e),
            FeedError::Entity(e) => Some(e),
            FeedError::Storage(e) => Some(e),
            FeedError::GraphQL(e) => Some(e),
            FeedError::Internal(_) => None,
        }
    }
}

/// Error body returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// HTTP-equivalent status code
    pub status: u16,
    /// Human-readable error message
    pub message: String,
    /// Collected violations, only for failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Violation>>,
}

impl FeedError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FeedError::Request(e) => e.status_code(),
            FeedError::Entity(e) => e.status_code(),
            FeedError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            FeedError::GraphQL(e) => e.status_code(),
            FeedError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error (used in logs)
    pub fn error_code(&self) -> &'static str {
        match self {
            FeedError::Validation(_) => "VALIDATION_FAILED",
            FeedError::Request(e) => e.error_code(),
            FeedError::Entity(e) => e.error_code(),
            FeedError::Storage(_) => "STORAGE_ERROR",
            FeedError::GraphQL(e) => e.error_code(),
            FeedError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let data = match self {
            FeedError::Validation(e) => Some(e.violations.clone()),
            _ => None,
        };

        ErrorResponse {
            status: self.status_code().as_u16(),
            message: self.to_string(),
            data,
        }
    }
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Field the rule was applied to (not part of the wire shape)
    #[serde(skip)]
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All violations collected for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid input.")
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for FeedError {
    fn from(err: ValidationError) -> Self {
        FeedError::Validation(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Authentication and authorization failures
#[derive(Debug)]
pub enum RequestError {
    /// No valid identity, or the identity no longer resolves to a user
    Unauthenticated { message: String },

    /// Identity is valid but does not own the resource
    Forbidden { message: String },

    /// Malformed request body
    BadRequest { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Unauthenticated { message } => write!(f, "{}", message),
            RequestError::Forbidden { message } => write!(f, "{}", message),
            RequestError::BadRequest { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthenticated { .. } => "UNAUTHENTICATED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

impl From<RequestError> for FeedError {
    fn from(err: RequestError) -> Self {
        FeedError::Request(err)
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to users and posts
#[derive(Debug)]
pub enum EntityError {
    /// Entity was not found
    NotFound { entity_type: String, id: String },

    /// Entity conflicts with an existing one (duplicate email)
    AlreadyExists {
        entity_type: String,
        message: String,
    },

    /// Entity changed between read and write
    ModifiedConcurrently { entity_type: String, id: String },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, .. } => {
                write!(f, "No {} found!", entity_type)
            }
            EntityError::AlreadyExists { message, .. } => write!(f, "{}", message),
            EntityError::ModifiedConcurrently { entity_type, .. } => {
                let mut chars = entity_type.chars();
                let capitalized: String = match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                };
                write!(f, "{} was modified concurrently", capitalized)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
            EntityError::ModifiedConcurrently { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "NOT_FOUND",
            EntityError::AlreadyExists { .. } => "CONFLICT",
            EntityError::ModifiedConcurrently { .. } => "MODIFIED_CONCURRENTLY",
        }
    }
}

impl From<EntityError> for FeedError {
    fn from(err: EntityError) -> Self {
        FeedError::Entity(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

impl From<StorageError> for FeedError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateKey { collection, .. } if collection == "users" => {
                FeedError::conflict("user", "User exists already")
            }
            StorageError::VersionConflict { collection, id } => {
                FeedError::Entity(EntityError::ModifiedConcurrently {
                    entity_type: collection.trim_end_matches('s').to_string(),
                    id,
                })
            }
            other => FeedError::Storage(other),
        }
    }
}

// =============================================================================
// GraphQL Errors
// =============================================================================

/// Errors related to GraphQL documents
#[derive(Debug)]
pub enum GraphQLError {
    /// Document could not be parsed
    ParseError { message: String },

    /// Root field is not a known query or mutation
    UnknownField { operation: String, field: String },

    /// Required argument is absent
    MissingArgument { field: String, argument: String },

    /// Argument has the wrong shape
    InvalidArgument { argument: String, message: String },

    /// Operation kind or name cannot be executed
    InvalidOperation { message: String },
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphQLError::ParseError { message } => {
                write!(f, "GraphQL parse error: {}", message)
            }
            GraphQLError::UnknownField { operation, field } => {
                write!(f, "Cannot query field '{}' on type '{}'", field, operation)
            }
            GraphQLError::MissingArgument { field, argument } => {
                write!(
                    f,
                    "Field '{}' argument '{}' is required but not provided",
                    field, argument
                )
            }
            GraphQLError::InvalidArgument { argument, message } => {
                write!(f, "Invalid value for argument '{}': {}", argument, message)
            }
            GraphQLError::InvalidOperation { message } => {
                write!(f, "Invalid GraphQL operation: {}", message)
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GraphQLError::ParseError { .. } => StatusCode::BAD_REQUEST,
            GraphQLError::UnknownField { .. } => StatusCode::BAD_REQUEST,
            GraphQLError::MissingArgument { .. } => StatusCode::BAD_REQUEST,
            GraphQLError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            GraphQLError::InvalidOperation { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GraphQLError::ParseError { .. } => "GRAPHQL_PARSE_ERROR",
            GraphQLError::UnknownField { .. } => "GRAPHQL_UNKNOWN_FIELD",
            GraphQLError::MissingArgument { .. } => "GRAPHQL_MISSING_ARGUMENT",
            GraphQLError::InvalidArgument { .. } => "GRAPHQL_INVALID_ARGUMENT",
            GraphQLError::InvalidOperation { .. } => "GRAPHQL_INVALID_OPERATION",
        }
    }
}

impl From<GraphQLError> for FeedError {
    fn from(err: GraphQLError) -> Self {
        FeedError::GraphQL(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<anyhow::Error> for FeedError {
    fn from(err: anyhow::Error) -> Self {
        FeedError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Internal(format!("serialization failed: {}", err))
    }
}
