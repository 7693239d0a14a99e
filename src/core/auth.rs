//! Authentication context and providers
//!
//! Every request carries an [`AuthContext`]. Providers never reject a
//! request: anything that does not yield a verified identity becomes
//! [`AuthContext::Anonymous`], and each operation decides whether that is
//! acceptable.

use crate::core::error::FeedError;
use crate::core::token::TokenIssuer;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use uuid::Uuid;

/// Identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Caller presented a valid bearer token
    User { user_id: Uuid, email: String },

    /// No (valid) credential
    Anonymous,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User { .. })
    }

    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Anonymous => None,
        }
    }

    /// The caller's id, or `Not authenticated!`
    pub fn require_user(&self) -> Result<Uuid, FeedError> {
        self.user_id().ok_or_else(FeedError::unauthenticated)
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        AuthContext::Anonymous
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the identity for a request from its headers
    ///
    /// An `Err` carries the reason the credential was rejected; callers
    /// treat it as anonymous.
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Provider that treats every request as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}

/// Bearer-token provider backed by a [`TokenIssuer`]
#[derive(Debug, Clone)]
pub struct JwtAuthProvider {
    issuer: TokenIssuer,
}

impl JwtAuthProvider {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
///
/// The value must split on a single space into exactly two parts.
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let value = value
            .to_str()
            .map_err(|_| anyhow!("authorization header is not valid ASCII"))?;
        let token =
            bearer_token(value).ok_or_else(|| anyhow!("malformed authorization header"))?;

        let claims = self.issuer.verify(token)?;
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|_| anyhow!("token subject is not a valid id"))?;

        Ok(AuthContext::User {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    fn provider() -> (JwtAuthProvider, TokenIssuer) {
        let issuer = TokenIssuer::new("auth-test-key", Duration::hours(1));
        (JwtAuthProvider::new(issuer.clone()), issuer)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    // --- bearer_token ---

    #[test]
    fn test_bearer_token_exact_form() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_shapes() {
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer  abc"), None);
        assert_eq!(bearer_token("Bearer abc def"), None);
    }

    // --- AuthContext ---

    #[test]
    fn test_require_user() {
        let id = Uuid::new_v4();
        let ctx = AuthContext::User {
            user_id: id,
            email: "a@b.c".into(),
        };
        assert_eq!(ctx.require_user().unwrap(), id);
        assert!(ctx.is_authenticated());

        let err = AuthContext::Anonymous.require_user().unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Not authenticated!");
    }

    #[test]
    fn test_default_is_anonymous() {
        assert_eq!(AuthContext::default(), AuthContext::Anonymous);
    }

    // --- JwtAuthProvider ---

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        let (provider, _) = provider();
        let ctx = provider.extract_context(&HeaderMap::new()).await.unwrap();
        assert_eq!(ctx, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_valid_token_yields_user() {
        let (provider, issuer) = provider();
        let id = Uuid::new_v4();
        let token = issuer.issue(&id.to_string(), "alice@test.com").unwrap();

        let ctx = provider
            .extract_context(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(
            ctx,
            AuthContext::User {
                user_id: id,
                email: "alice@test.com".into()
            }
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let (provider, issuer) = provider();
        let token = issuer
            .issue_at(
                &Uuid::new_v4().to_string(),
                "alice@test.com",
                Utc::now() - Duration::hours(2),
            )
            .unwrap();

        let result = provider
            .extract_context(&headers_with(&format!("Bearer {token}")))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_rejected() {
        let (provider, issuer) = provider();
        let token = issuer.issue(&Uuid::new_v4().to_string(), "a@b.c").unwrap();

        let result = provider
            .extract_context(&headers_with(&format!("Token {token}")))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_non_uuid_subject_is_rejected() {
        let (provider, issuer) = provider();
        let token = issuer.issue("not-a-uuid", "a@b.c").unwrap();

        let result = provider
            .extract_context(&headers_with(&format!("Bearer {token}")))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_no_auth_provider_is_anonymous() {
        let ctx = NoAuthProvider
            .extract_context(&headers_with("Bearer whatever"))
            .await
            .unwrap();
        assert_eq!(ctx, AuthContext::Anonymous);
    }
}
