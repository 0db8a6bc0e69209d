//! Metadata provider trait.
//!
//! The GraphQL layer never loads or authors metadata itself. It consumes a
//! `MetadataProvider` that enumerates resource classes and answers resource
//! and property lookups.

use std::sync::Arc;

use crate::error::MetadataError;
use crate::property::PropertyMetadata;
use crate::resource::ResourceMetadata;

/// Result type for metadata lookups.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// Source of resource and property metadata.
///
/// Implementations must be deterministic for the lifetime of one schema
/// build: the same class always yields the same metadata and the same
/// ordered property names.
pub trait MetadataProvider: Send + Sync {
    /// Returns every resource class known to the system.
    fn resource_classes(&self) -> Vec<String>;

    /// Returns the metadata of a resource class.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::ResourceClassNotFound` for unknown classes.
    fn resource(&self, class: &str) -> MetadataResult<Arc<ResourceMetadata>>;

    /// Returns the ordered property names of a resource class.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::ResourceClassNotFound` for unknown classes.
    fn property_names(&self, class: &str) -> MetadataResult<Vec<String>>;

    /// Returns the metadata of a single property.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::PropertyNotFound` for unknown properties.
    fn property(&self, class: &str, property: &str) -> MetadataResult<Arc<PropertyMetadata>>;

    /// Returns `true` if the class is a known resource.
    fn is_resource_class(&self, class: &str) -> bool {
        self.resource(class).is_ok()
    }
}

/// Shared metadata provider handle.
pub type DynMetadataProvider = Arc<dyn MetadataProvider>;
