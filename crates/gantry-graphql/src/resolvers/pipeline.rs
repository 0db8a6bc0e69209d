//! The resolver pipeline shared by every synthesized field.
//!
//! Item, mutation and collection resolution live in their own modules as
//! `impl ResolverPipeline` blocks; this module holds the pipeline state
//! and the checks they share.

use std::sync::Arc;

use gantry_metadata::{DynMetadataProvider, ResourceMetadata};
use serde_json::Value;
use tracing::error;

use super::context::StageContext;
use super::error::{MismatchSource, PipelineError};
use super::stages::{DynResolverLocator, InMemoryResolverLocator, ItemResolver, ResolverStages};
use crate::schema::node::{NodeTypeTable, item_resource_class};

/// Pagination settings of collection fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    pub enabled: bool,
    pub default_page_size: usize,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            default_page_size: 30,
        }
    }
}

/// Runs stages in order for item, mutation and collection fields.
pub struct ResolverPipeline {
    pub(crate) stages: ResolverStages,
    pub(crate) metadata: DynMetadataProvider,
    pub(crate) locator: DynResolverLocator,
    pub(crate) pagination: PaginationOptions,
    pub(crate) node_types: Arc<NodeTypeTable>,
}

impl ResolverPipeline {
    /// Creates a pipeline without custom resolvers.
    #[must_use]
    pub fn new(stages: ResolverStages, metadata: DynMetadataProvider) -> Self {
        Self {
            stages,
            metadata,
            locator: Arc::new(InMemoryResolverLocator::new()),
            pagination: PaginationOptions::default(),
            node_types: Arc::new(NodeTypeTable::new()),
        }
    }

    #[must_use]
    pub fn with_locator(mut self, locator: DynResolverLocator) -> Self {
        self.locator = locator;
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationOptions) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn with_node_types(mut self, node_types: Arc<NodeTypeTable>) -> Self {
        self.node_types = node_types;
        self
    }

    /// Resource class to concrete type table used to tag `Node` results.
    #[must_use]
    pub fn node_types(&self) -> &NodeTypeTable {
        &self.node_types
    }

    #[must_use]
    pub fn pagination(&self) -> PaginationOptions {
        self.pagination
    }

    /// Runs the read stage for an item field and checks its result.
    pub(crate) async fn read_item(
        &self,
        resource_class: Option<&str>,
        root_class: Option<&str>,
        operation: &str,
        context: &StageContext,
    ) -> Result<Option<Value>, PipelineError> {
        let item = self
            .stages
            .read
            .read(resource_class, root_class, operation, context)
            .await?;

        match item {
            None | Some(Value::Null) => Ok(None),
            Some(item @ Value::Object(_)) => Ok(Some(item)),
            Some(other) => {
                error!(
                    field = %context.field_name,
                    found = json_kind(&other),
                    "Read stage returned a non-object item"
                );
                Err(PipelineError::InvalidReadResult {
                    field: context.field_name.clone(),
                    found: json_kind(&other),
                })
            }
        }
    }

    pub(crate) fn resource(
        &self,
        resource_class: &str,
    ) -> Result<Arc<ResourceMetadata>, PipelineError> {
        Ok(self.metadata.resource(resource_class)?)
    }

    pub(crate) fn query_resolver(&self, id: &str) -> Result<Arc<dyn ItemResolver>, PipelineError> {
        self.locator
            .query_resolver(id)
            .ok_or_else(|| PipelineError::ResolverNotFound(id.to_string()))
    }

    pub(crate) fn mutation_resolver(
        &self,
        id: &str,
    ) -> Result<Arc<dyn ItemResolver>, PipelineError> {
        self.locator
            .mutation_resolver(id)
            .ok_or_else(|| PipelineError::ResolverNotFound(id.to_string()))
    }
}

/// Determines the resource class of an item.
///
/// The class recorded in the item envelope must match `expected` when both
/// are known. Without an envelope class the expected class is used.
pub(crate) fn resolve_resource_class(
    item: Option<&Value>,
    expected: Option<&str>,
    origin: MismatchSource,
) -> Result<String, PipelineError> {
    let actual = item.and_then(item_resource_class);

    match (expected, actual) {
        (Some(expected), Some(actual)) if expected != actual => {
            Err(PipelineError::mismatch(origin, expected, actual))
        }
        (Some(expected), _) => Ok(expected.to_string()),
        (None, Some(actual)) => Ok(actual.to_string()),
        (None, None) => Err(PipelineError::UnresolvedResourceClass),
    }
}

/// Short name of a JSON value kind, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_resource_class_prefers_expected() {
        let item = json!({"#itemResourceClass": "app::Book"});
        assert_eq!(
            resolve_resource_class(Some(&item), Some("app::Book"), MismatchSource::Read).unwrap(),
            "app::Book"
        );
        assert_eq!(
            resolve_resource_class(Some(&json!({})), Some("app::Book"), MismatchSource::Read)
                .unwrap(),
            "app::Book"
        );
        assert_eq!(
            resolve_resource_class(None, Some("app::Book"), MismatchSource::Read).unwrap(),
            "app::Book"
        );
    }

    #[test]
    fn test_resolve_resource_class_from_item() {
        let item = json!({"#itemResourceClass": "app::Person"});
        assert_eq!(
            resolve_resource_class(Some(&item), None, MismatchSource::Read).unwrap(),
            "app::Person"
        );
    }

    #[test]
    fn test_resolve_resource_class_failures() {
        let item = json!({"#itemResourceClass": "app::Person"});
        let err = resolve_resource_class(Some(&item), Some("app::Book"), MismatchSource::Read)
            .unwrap_err();
        assert!(matches!(err, PipelineError::ResourceClassMismatch { .. }));

        let err = resolve_resource_class(None, None, MismatchSource::Read).unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedResourceClass));
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!("x")), "string");
        assert_eq!(json_kind(&json!([1])), "list");
        assert_eq!(json_kind(&json!({})), "object");
    }
}
