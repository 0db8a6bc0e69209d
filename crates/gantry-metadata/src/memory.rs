//! In-memory metadata provider.
//!
//! `InMemoryMetadataProvider` holds every resource and property descriptor in
//! memory. It is the provider used by tests and by applications that describe
//! their resources in code or deserialize them from a document at startup.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::MetadataError;
use crate::property::PropertyMetadata;
use crate::provider::{MetadataProvider, MetadataResult};
use crate::resource::ResourceMetadata;

/// One resource together with its ordered properties.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDefinition {
    #[serde(flatten)]
    pub resource: ResourceMetadata,

    #[serde(default)]
    pub properties: Vec<PropertyMetadata>,
}

#[derive(Debug)]
struct Entry {
    resource: Arc<ResourceMetadata>,
    properties: IndexMap<String, Arc<PropertyMetadata>>,
}

/// Metadata provider backed by in-memory descriptors.
///
/// Resource classes are enumerated in registration order.
///
/// # Example
///
/// ```
/// use gantry_metadata::{
///     BuiltinType, InMemoryMetadataProvider, MetadataProvider, OperationConfig,
///     PropertyMetadata, PropertyType, ResourceMetadata,
/// };
///
/// let provider = InMemoryMetadataProvider::new().with_resource(
///     ResourceMetadata::new("app::Book", "Book").with_operation("query", OperationConfig::new()),
///     vec![PropertyMetadata::new("title", PropertyType::new(BuiltinType::String, false))],
/// );
///
/// assert_eq!(provider.resource_classes(), vec!["app::Book".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMetadataProvider {
    entries: IndexMap<String, Entry>,
}

impl InMemoryMetadataProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider from a list of resource definitions.
    #[must_use]
    pub fn from_definitions(definitions: Vec<ResourceDefinition>) -> Self {
        let mut provider = Self::new();
        for definition in definitions {
            provider.register(definition.resource, definition.properties);
        }

        debug!(
            resource_count = provider.entries.len(),
            "InMemoryMetadataProvider initialized"
        );

        provider
    }

    /// Registers a resource and its properties, replacing any previous entry
    /// for the same class.
    pub fn register(&mut self, resource: ResourceMetadata, properties: Vec<PropertyMetadata>) {
        let properties = properties
            .into_iter()
            .map(|property| (property.name.clone(), Arc::new(property)))
            .collect();

        self.entries.insert(
            resource.class.clone(),
            Entry {
                resource: Arc::new(resource),
                properties,
            },
        );
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with_resource(
        mut self,
        resource: ResourceMetadata,
        properties: Vec<PropertyMetadata>,
    ) -> Self {
        self.register(resource, properties);
        self
    }

    /// Returns the number of registered resources.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, class: &str) -> MetadataResult<&Entry> {
        self.entries
            .get(class)
            .ok_or_else(|| MetadataError::resource_class_not_found(class))
    }
}

impl MetadataProvider for InMemoryMetadataProvider {
    fn resource_classes(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn resource(&self, class: &str) -> MetadataResult<Arc<ResourceMetadata>> {
        self.entry(class).map(|entry| Arc::clone(&entry.resource))
    }

    fn property_names(&self, class: &str) -> MetadataResult<Vec<String>> {
        self.entry(class)
            .map(|entry| entry.properties.keys().cloned().collect())
    }

    fn property(&self, class: &str, property: &str) -> MetadataResult<Arc<PropertyMetadata>> {
        self.entry(class)?
            .properties
            .get(property)
            .cloned()
            .ok_or_else(|| MetadataError::property_not_found(class, property))
    }
}
