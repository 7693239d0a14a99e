//! Core module: entities, operations, auth and validation
//!
//! Everything here is transport-agnostic; the `server` module exposes it over
//! HTTP.

pub mod auth;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod media;
pub mod password;
pub mod service;
pub mod store;
pub mod token;
pub mod validation;
pub mod view;

pub use auth::{AuthContext, AuthProvider, JwtAuthProvider, NoAuthProvider};
pub use entity::{Entity, Post, User};
pub use error::FeedError;
pub use media::{ImageStore, LocalImageStore};
pub use password::PasswordHasher;
pub use service::{FeedService, PostInput, UserInput};
pub use store::{PostStore, UserStore};
pub use token::{Claims, TokenIssuer};
