//! Password hashing (bcrypt)
//!
//! Hashing is CPU-bound and runs on the blocking thread pool.

use anyhow::{Context, Result};

/// Salted one-way hashing with a configurable cost
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("password hashing task failed")?
            .context("failed to hash password")
    }

    /// Compare a candidate password with a stored hash
    ///
    /// A malformed stored hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("password verification task failed")?
            .unwrap_or(false);

        Ok(matched)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
