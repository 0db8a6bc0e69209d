//! Metadata error types.
//!
//! Lookups against the metadata provider fail with these errors. The GraphQL
//! layer treats `ResourceClassNotFound` as "omit the field" during schema
//! construction, never as a fatal condition.

/// Errors that can occur while looking up resource or property metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// The requested resource class is not known to the provider.
    #[error("Resource class not found: {class}")]
    ResourceClassNotFound {
        /// The resource class that was looked up.
        class: String,
    },

    /// The requested property does not exist on the resource.
    #[error("Property not found: {class}::{property}")]
    PropertyNotFound {
        /// The owning resource class.
        class: String,
        /// The property name that was looked up.
        property: String,
    },

    /// A type name could not be interpreted.
    #[error("Invalid type: {type_name}")]
    InvalidType {
        /// The offending type name.
        type_name: String,
    },
}

impl MetadataError {
    /// Creates a new `ResourceClassNotFound` error.
    #[must_use]
    pub fn resource_class_not_found(class: impl Into<String>) -> Self {
        Self::ResourceClassNotFound {
            class: class.into(),
        }
    }

    /// Creates a new `PropertyNotFound` error.
    #[must_use]
    pub fn property_not_found(class: impl Into<String>, property: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            class: class.into(),
            property: property.into(),
        }
    }

    /// Creates a new `InvalidType` error.
    #[must_use]
    pub fn invalid_type(type_name: impl Into<String>) -> Self {
        Self::InvalidType {
            type_name: type_name.into(),
        }
    }

    /// Returns `true` if the resource class is unknown.
    #[must_use]
    pub fn is_resource_class_not_found(&self) -> bool {
        matches!(self, Self::ResourceClassNotFound { .. })
    }
}
