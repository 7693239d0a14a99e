//! Axum extractors
//!
//! The auth gate stores an [`AuthContext`] in the request extensions; handlers
//! take it as an argument. Requests that never went through the gate are
//! anonymous.

use crate::core::auth::AuthContext;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}
