//! # gantry-graphql
//!
//! Dynamic GraphQL layer for resource-oriented APIs.
//!
//! The schema is synthesized at runtime from resource metadata supplied by
//! [`gantry_metadata`]. Every field resolves through a staged pipeline
//! whose stages (read, deny access, deserialize, validate, write,
//! serialize) are provided by the application:
//!
//! - Query fields for single items, collections and the `node` field
//! - Relay connections with opaque cursors for collections
//! - Mutation fields per configured operation with `clientMutationId`
//! - Filter arguments derived from filter descriptions
//!
//! ## Configuration
//!
//! Add to `gantry.toml`:
//!
//! ```toml
//! [graphql]
//! pagination_enabled = true
//! default_page_size = 30
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`schema`] - Schema synthesis and lazy loading
//! - [`resolvers`] - Resolver pipeline and stage contracts
//! - [`error`] - Error types for schema construction

pub mod config;
pub mod error;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use config::GraphQLConfig;
pub use error::GraphQLError;
pub use resolvers::{PipelineError, ResolverPipeline, ResolverStages, StageContext, StageError};
pub use schema::{LazySchema, ResourceSchemaBuilder, SchemaBuilderConfig, SchemaState};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
