//! Resource metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the read operation.
pub const QUERY_OPERATION: &str = "query";

/// Name of the create mutation.
pub const CREATE_OPERATION: &str = "create";

/// Name of the update mutation.
pub const UPDATE_OPERATION: &str = "update";

/// Name of the delete mutation.
pub const DELETE_OPERATION: &str = "delete";

/// GraphQL configuration of a single operation on a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationConfig {
    /// Filter identifiers applied to collection fields of the resource.
    #[serde(default)]
    pub filters: Vec<String>,

    /// Custom item query resolver identifier.
    #[serde(default)]
    pub item_query: Option<String>,

    /// Custom collection query resolver identifier.
    #[serde(default)]
    pub collection_query: Option<String>,

    /// Custom mutation resolver identifier.
    #[serde(default)]
    pub mutation: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

impl OperationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_item_query(mut self, resolver_id: impl Into<String>) -> Self {
        self.item_query = Some(resolver_id.into());
        self
    }

    #[must_use]
    pub fn with_collection_query(mut self, resolver_id: impl Into<String>) -> Self {
        self.collection_query = Some(resolver_id.into());
        self
    }

    #[must_use]
    pub fn with_mutation(mut self, resolver_id: impl Into<String>) -> Self {
        self.mutation = Some(resolver_id.into());
        self
    }

    #[must_use]
    pub fn with_deprecation_reason(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

/// Metadata describing a resource exposed by the API.
///
/// The `class` is the resource identity used everywhere as a key; the
/// `short_name` is the public name from which GraphQL type names are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub class: String,

    pub short_name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Operation name to configuration. `None` or empty means the resource
    /// is not exposed through GraphQL.
    #[serde(default)]
    pub graphql: Option<IndexMap<String, OperationConfig>>,
}

impl ResourceMetadata {
    /// Creates metadata for a resource that is not (yet) GraphQL-exposed.
    #[must_use]
    pub fn new(class: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            short_name: short_name.into(),
            description: None,
            graphql: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds (or replaces) the configuration of an operation.
    #[must_use]
    pub fn with_operation(mut self, name: impl Into<String>, config: OperationConfig) -> Self {
        self.graphql
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), config);
        self
    }

    /// Returns `true` if at least one GraphQL operation is configured.
    #[must_use]
    pub fn is_graphql_exposed(&self) -> bool {
        self.graphql.as_ref().is_some_and(|ops| !ops.is_empty())
    }

    /// Returns the configuration of the named operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationConfig> {
        self.graphql.as_ref().and_then(|ops| ops.get(name))
    }

    /// Iterates over the configured operation names in declaration order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.graphql
            .iter()
            .flat_map(|ops| ops.keys().map(String::as_str))
    }

    /// Filter identifiers configured on the `query` operation.
    #[must_use]
    pub fn query_filters(&self) -> &[String] {
        self.operation(QUERY_OPERATION)
            .map(|config| config.filters.as_slice())
            .unwrap_or_default()
    }
}

/// Returns the last path segment of a resource class (`app::model::Book` -> `Book`).
#[must_use]
pub fn short_class_name(class: &str) -> &str {
    class
        .rsplit("::")
        .next()
        .and_then(|tail| tail.rsplit('\\').next())
        .unwrap_or(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_class_name() {
        assert_eq!(short_class_name("app::model::Book"), "Book");
        assert_eq!(short_class_name("App\\Entity\\Book"), "Book");
        assert_eq!(short_class_name("Book"), "Book");
    }

    #[test]
    fn test_graphql_exposure() {
        let resource = ResourceMetadata::new("app::Book", "Book");
        assert!(!resource.is_graphql_exposed());

        let resource = resource.with_operation(QUERY_OPERATION, OperationConfig::new());
        assert!(resource.is_graphql_exposed());
        assert!(resource.operation(QUERY_OPERATION).is_some());
        assert!(resource.operation(DELETE_OPERATION).is_none());
    }

    #[test]
    fn test_operation_names_keep_order() {
        let resource = ResourceMetadata::new("app::Book", "Book")
            .with_operation(QUERY_OPERATION, OperationConfig::new())
            .with_operation(CREATE_OPERATION, OperationConfig::new())
            .with_operation(DELETE_OPERATION, OperationConfig::new());

        let names: Vec<_> = resource.operation_names().collect();
        assert_eq!(names, vec!["query", "create", "delete"]);
    }

    #[test]
    fn test_query_filters() {
        let resource = ResourceMetadata::new("app::Book", "Book").with_operation(
            QUERY_OPERATION,
            OperationConfig::new().with_filters(["book.search", "book.order"]),
        );
        assert_eq!(resource.query_filters(), ["book.search", "book.order"]);

        let bare = ResourceMetadata::new("app::Book", "Book");
        assert!(bare.query_filters().is_empty());
    }
}
