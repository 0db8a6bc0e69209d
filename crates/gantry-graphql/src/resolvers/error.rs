//! Errors raised while a field resolves.
//!
//! Stage collaborators report failures with [`StageError`]. The pipeline
//! wraps those together with its own consistency checks in
//! [`PipelineError`], which converts into a GraphQL error carrying a
//! `code` extension. Internal faults are logged and reported to clients
//! without their details.

use async_graphql::ErrorExtensions;
use gantry_metadata::{MetadataError, short_class_name};
use tracing::error;

/// Message returned to clients for internal faults.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Failure reported by a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// The security stage rejected the operation.
    #[error("{0}")]
    AccessDenied(String),

    /// The validation stage rejected the item.
    #[error("{message}")]
    ValidationFailed {
        message: String,
        violations: Vec<String>,
    },

    /// The requested item does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Any other stage failure. Details are not shown to clients.
    #[error("{0}")]
    Internal(String),
}

impl StageError {
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    #[must_use]
    pub fn validation_failed(message: impl Into<String>, violations: Vec<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            violations,
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "ACCESS_DENIED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Component that produced an item of the wrong resource class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchSource {
    /// The read stage.
    Read,
    /// A custom item query resolver.
    QueryResolver(String),
    /// A custom mutation resolver.
    MutationResolver(String),
}

fn mismatch_message(origin: &MismatchSource, expected: &str, actual: &str) -> String {
    let expected = short_class_name(expected);
    let actual = short_class_name(actual);
    match origin {
        MismatchSource::Read => format!(
            "Resolver only handles items of class {expected} but retrieved item is of class {actual}."
        ),
        MismatchSource::QueryResolver(id) => format!(
            "Custom query resolver \"{id}\" has to return an item of class {expected} but returned an item of class {actual}."
        ),
        MismatchSource::MutationResolver(id) => format!(
            "Custom mutation resolver \"{id}\" has to return an item of class {expected} but returned an item of class {actual}."
        ),
    }
}

/// Errors produced by the resolver pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A produced item does not belong to the resource class the field
    /// resolves.
    #[error("{}", mismatch_message(.origin, .expected, .actual))]
    ResourceClassMismatch {
        origin: MismatchSource,
        expected: String,
        actual: String,
    },

    /// Neither the field nor the item names a resource class.
    #[error("Resource class cannot be determined.")]
    UnresolvedResourceClass,

    /// The read stage returned something other than an object or null.
    #[error("Item from read stage for field \"{field}\" should be a nullable object, got {found}")]
    InvalidReadResult { field: String, found: &'static str },

    /// The read stage returned something that is not a collection.
    #[error("Collection from read stage for field \"{field}\" should be a list or a page, got {found}")]
    InvalidCollectionResult { field: String, found: &'static str },

    /// A custom resolver identifier is configured but not registered.
    #[error("Custom resolver \"{0}\" is not registered")]
    ResolverNotFound(String),

    /// The `after` argument is not a cursor issued by this API.
    #[error("Cursor {0} is invalid")]
    InvalidCursor(String),

    /// A stage failed.
    #[error(transparent)]
    Stage(#[from] StageError),

    /// Resource metadata could not be loaded.
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

impl PipelineError {
    #[must_use]
    pub fn mismatch(
        origin: MismatchSource,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ResourceClassMismatch {
            origin,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns `true` for faults whose details must not reach clients.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::InvalidReadResult { .. }
                | Self::InvalidCollectionResult { .. }
                | Self::ResolverNotFound(_)
                | Self::Metadata(_)
                | Self::Stage(StageError::Internal(_))
        )
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceClassMismatch { .. } => "RESOURCE_CLASS_MISMATCH",
            Self::UnresolvedResourceClass => "UNRESOLVED_RESOURCE_CLASS",
            Self::InvalidCursor(_) => "INVALID_CURSOR",
            Self::Stage(stage) => stage.code(),
            Self::InvalidReadResult { .. }
            | Self::InvalidCollectionResult { .. }
            | Self::ResolverNotFound(_)
            | Self::Metadata(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts into the error reported on the GraphQL response.
    pub fn into_graphql_error(self) -> async_graphql::Error {
        if self.is_internal() {
            error!(error = %self, "Internal fault while resolving field");
            return async_graphql::Error::new(INTERNAL_ERROR_MESSAGE)
                .extend_with(|_, e| e.set("code", "INTERNAL_ERROR"));
        }

        let code = self.code();
        let violations = match &self {
            Self::Stage(StageError::ValidationFailed { violations, .. }) => violations.clone(),
            _ => Vec::new(),
        };

        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", code);
            if !violations.is_empty() {
                e.set(
                    "violations",
                    async_graphql::Value::List(
                        violations
                            .iter()
                            .map(|v| async_graphql::Value::String(v.clone()))
                            .collect(),
                    ),
                );
            }
        })
    }
}
