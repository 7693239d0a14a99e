//! Server module for building the HTTP server
//!
//! `ServerBuilder` wires the stores into a [`ServerHost`] and exposes it via:
//! - GraphQL (`/graphql`, `/graphql/schema`)
//! - REST (health checks, image upload, static images)

pub mod builder;
pub mod exposure;
pub mod host;
pub mod middleware;

pub use builder::ServerBuilder;
pub use host::ServerHost;
