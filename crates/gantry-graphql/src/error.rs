//! Error types for schema construction.
//!
//! Errors raised while a single field resolves live in
//! [`crate::resolvers::PipelineError`]; this module covers failures that
//! concern the schema as a whole. They surface at startup (or on the first
//! request when the schema is built lazily), never per field.

use gantry_metadata::MetadataError;

/// Errors that can occur while building or serving the schema.
#[derive(Debug, thiserror::Error)]
pub enum GraphQLError {
    /// Schema is still being built - client should retry.
    #[error("GraphQL schema is initializing, please retry")]
    SchemaInitializing,

    /// Schema build failed.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),

    /// A property type cannot be represented in GraphQL.
    #[error("The type \"{type_name}\" of {location} is not supported")]
    UnsupportedType {
        /// The builtin kind that was rejected.
        type_name: String,
        /// Where the type was declared (`Book.cover`, `filter book.search`).
        location: String,
    },

    /// A metadata lookup failed for a resource that must exist.
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Configuration values are invalid.
    #[error("Invalid GraphQL configuration: {0}")]
    InvalidConfig(String),
}

impl GraphQLError {
    /// Creates a new `UnsupportedType` error.
    #[must_use]
    pub fn unsupported_type(type_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
            location: location.into(),
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaInitializing => "SCHEMA_INITIALIZING",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::Metadata(_) => "METADATA_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}
