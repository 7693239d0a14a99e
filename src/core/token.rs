//! Session tokens
//!
//! A session is never stored server-side: the token itself carries the
//! claims and is trusted as long as its signature matches the configured key
//! and its expiry has not passed. There is no revocation list.

use crate::config::{AuthConfig, MAX_TOKEN_TTL_SECS};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Identity claims embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User ID as a string
    pub user_id: String,

    /// User's email
    pub email: String,

    /// Issued at (as Unix timestamp)
    pub iat: i64,

    /// Expiration time (as Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(signing_key: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(signing_key.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let secs = config.token_ttl_secs.min(MAX_TOKEN_TTL_SECS);
        let secs = i64::try_from(secs).unwrap_or(0);
        Self::new(&config.signing_key, Duration::seconds(secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token valid from now for the configured lifetime
    pub fn issue(&self, user_id: &str, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`
    pub fn issue_at(&self, user_id: &str, email: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign token")
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("token rejected")?;
        Ok(data.claims)
    }
}
