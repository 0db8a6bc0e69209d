//! Filter registry contract.
//!
//! A filter describes the request parameters it understands as a map of
//! flattened query-string keys (`order[name]`, `tags[]`) to a type name and a
//! `required` flag. The GraphQL layer turns those keys into nested input
//! arguments.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One parameter understood by a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParameter {
    /// The resource property the parameter applies to, if any.
    #[serde(default)]
    pub property: Option<String>,

    /// Builtin type name (`string`, `int`, `bool`, ...) or an object class name.
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub required: bool,
}

impl FilterParameter {
    /// Creates an optional parameter of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            property: None,
            type_name: type_name.into(),
            required: false,
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Flattened parameter key to parameter description, in declaration order.
pub type FilterDescription = IndexMap<String, FilterParameter>;

/// Lookup of filters by identifier.
pub trait FilterLocator: Send + Sync {
    /// Returns `true` if a filter with this identifier is registered.
    fn has(&self, filter_id: &str) -> bool;

    /// Returns the description of a filter as applied to `resource_class`.
    fn description(&self, filter_id: &str, resource_class: &str) -> Option<FilterDescription>;
}

/// Shared filter locator handle.
pub type DynFilterLocator = Arc<dyn FilterLocator>;

/// Filter locator backed by static descriptions.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFilterLocator {
    filters: HashMap<String, FilterDescription>,
}

impl InMemoryFilterLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a filter description under `filter_id`.
    pub fn register(&mut self, filter_id: impl Into<String>, description: FilterDescription) {
        self.filters.insert(filter_id.into(), description);
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with_filter<K, I>(mut self, filter_id: impl Into<String>, parameters: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FilterParameter)>,
    {
        let description = parameters
            .into_iter()
            .map(|(key, parameter)| (key.into(), parameter))
            .collect();
        self.register(filter_id, description);
        self
    }
}

impl FilterLocator for InMemoryFilterLocator {
    fn has(&self, filter_id: &str) -> bool {
        self.filters.contains_key(filter_id)
    }

    fn description(&self, filter_id: &str, _resource_class: &str) -> Option<FilterDescription> {
        self.filters.get(filter_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_lookup() {
        let locator = InMemoryFilterLocator::new().with_filter(
            "book.order",
            [
                ("order[name]", FilterParameter::new("string")),
                ("order[direction]", FilterParameter::new("string").required()),
            ],
        );

        assert!(locator.has("book.order"));
        assert!(!locator.has("book.search"));

        let description = locator.description("book.order", "app::Book").unwrap();
        let keys: Vec<_> = description.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["order[name]", "order[direction]"]);
        assert!(description["order[direction]"].required);
        assert!(locator.description("book.search", "app::Book").is_none());
    }

    #[test]
    fn test_parameter_from_json() {
        let parameter: FilterParameter =
            serde_json::from_value(serde_json::json!({ "type": "int", "property": "pages" }))
                .unwrap();
        assert_eq!(parameter.type_name, "int");
        assert_eq!(parameter.property.as_deref(), Some("pages"));
        assert!(!parameter.required);
    }
}
