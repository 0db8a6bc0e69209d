//! Relay `Node` interface and concrete type lookup.
//!
//! Items flowing through the resolver pipeline are JSON envelopes. An
//! envelope may carry its resource class under [`ITEM_RESOURCE_CLASS_KEY`];
//! the [`NodeTypeTable`] maps that class to the GraphQL object type the
//! `node` field must report.

use std::collections::HashMap;

use async_graphql::dynamic::{Interface, InterfaceField, TypeRef};
use serde_json::Value;

use super::cache::BuildContext;

/// Name of the Relay node interface.
pub const NODE_INTERFACE: &str = "Node";

/// Envelope key holding the resource class of a serialized item.
pub const ITEM_RESOURCE_CLASS_KEY: &str = "#itemResourceClass";

/// Returns the resource class recorded in an item envelope.
#[must_use]
pub fn item_resource_class(item: &Value) -> Option<&str> {
    item.get(ITEM_RESOURCE_CLASS_KEY).and_then(Value::as_str)
}

/// Resource class to concrete object type name, for every type that
/// implements `Node`.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeTable {
    types: HashMap<String, String>,
}

impl NodeTypeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the node-implementing resource types of a finished build.
    #[must_use]
    pub fn from_context(ctx: &BuildContext) -> Self {
        let mut table = Self::new();
        for (_, schema_type) in ctx.types() {
            if !schema_type.implements_node {
                continue;
            }
            if let Some(class) = &schema_type.resource_class {
                table.insert(class.clone(), schema_type.name.clone());
            }
        }
        table
    }

    pub fn insert(&mut self, resource_class: impl Into<String>, type_name: impl Into<String>) {
        self.types.insert(resource_class.into(), type_name.into());
    }

    /// Returns the object type name registered for a resource class.
    #[must_use]
    pub fn type_name(&self, resource_class: &str) -> Option<&str> {
        self.types.get(resource_class).map(String::as_str)
    }

    /// Determines the concrete object type of an item envelope.
    #[must_use]
    pub fn resolve_type(&self, item: &Value) -> Option<&str> {
        self.type_name(item_resource_class(item)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Builds the `Node` interface.
#[must_use]
pub fn node_interface() -> Interface {
    Interface::new(NODE_INTERFACE)
        .description("A node, according to the Relay specification.")
        .field(
            InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID))
                .description("The id of this node."),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::cache::{SchemaType, TypeKey, TypeKind};
    use serde_json::json;

    #[test]
    fn test_resolve_type_from_envelope() {
        let mut table = NodeTypeTable::new();
        table.insert("app::Book", "Book");

        let item = json!({"id": "/books/1", "#itemResourceClass": "app::Book"});
        assert_eq!(table.resolve_type(&item), Some("Book"));

        let unknown = json!({"id": "/cars/1", "#itemResourceClass": "app::Car"});
        assert_eq!(table.resolve_type(&unknown), None);

        let untagged = json!({"id": "/books/1"});
        assert_eq!(table.resolve_type(&untagged), None);
    }

    #[test]
    fn test_from_context_only_collects_node_types() {
        let mut ctx = BuildContext::new();
        ctx.declare(
            TypeKey::Resource {
                class: "app::Book".into(),
                mutation: None,
                input: false,
                nested: false,
            },
            SchemaType::new("Book", TypeKind::Object).resource("app::Book", true),
        )
        .unwrap();
        ctx.declare(
            TypeKey::Resource {
                class: "app::Book".into(),
                mutation: Some("create".into()),
                input: false,
                nested: false,
            },
            SchemaType::new("createBookPayload", TypeKind::Object).resource("app::Book", false),
        )
        .unwrap();

        let table = NodeTypeTable::from_context(&ctx);
        assert_eq!(table.len(), 1);
        assert_eq!(table.type_name("app::Book"), Some("Book"));
    }
}
