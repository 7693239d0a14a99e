//! Configuration loading and management

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for the feed server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub feed: FeedSettings,
    pub storage: StorageConfig,
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Token and password settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing key; override it outside development
    pub signing_key: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: u64,

    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: "somesupersecretsecret".to_string(),
            token_ttl_secs: 3600,
            bcrypt_cost: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Number of posts per page
    pub page_size: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self { page_size: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Connection string, required for the mongodb backend
    pub mongodb_uri: Option<String>,

    pub database: String,

    /// Upper bound for a single backend call
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            mongodb_uri: None,
            database: "messages".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Directory uploaded images are written to and served from
    pub dir: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("images"),
        }
    }
}

impl FeedConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `FEED_CONFIG` if set, otherwise defaults, then apply
    /// environment overrides and validate
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("FEED_CONFIG") {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `FEED_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("FEED_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(key) = lookup("FEED_SIGNING_KEY") {
            self.auth.signing_key = key;
        }
        if let Some(uri) = lookup("FEED_MONGODB_URI") {
            self.storage.mongodb_uri = Some(uri);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.signing_key.is_empty() {
            bail!("auth.signing_key must not be empty");
        }
        if self.auth.token_ttl_secs == 0 {
            bail!("auth.token_ttl_secs must be greater than zero");
        }
        if self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            bail!(
                "auth.token_ttl_secs must be at most {} (one year)",
                MAX_TOKEN_TTL_SECS
            );
        }
        if self.feed.page_size == 0 {
            bail!("feed.page_size must be greater than zero");
        }
        if self.storage.backend == StorageBackend::Mongodb && self.storage.mongodb_uri.is_none() {
            bail!("storage.mongodb_uri is required for the mongodb backend");
        }
        Ok(())
    }
}
