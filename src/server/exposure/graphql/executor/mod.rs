//! GraphQL executor module
//!
//! A small executor over `graphql_parser` documents, split into:
//! - `core`: operation selection, root-field dispatch and error collection
//! - `query_executor`: query root fields
//! - `mutation_executor`: mutation root fields
//! - `field_resolver`: selection-set projection
//! - `utils`: argument decoding and variable substitution

mod core;
mod field_resolver;
mod mutation_executor;
mod query_executor;
mod utils;

pub use self::core::GraphQLExecutor;
pub use utils::Variables;
