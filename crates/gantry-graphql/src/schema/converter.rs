//! Property type to GraphQL type conversion.
//!
//! The converter maps a semantic [`PropertyType`] onto a GraphQL type
//! reference, declaring resource object types, connection wrappers and the
//! `Iterable` scalar in the [`BuildContext`] as it goes. Resource types are
//! only declared and queued here; their fields are computed by the schema
//! builder when it drains the queue.

use async_graphql::dynamic::TypeRef;
use gantry_metadata::{
    BuiltinType, MetadataProvider, PropertyType, ResourceMetadata, UPDATE_OPERATION,
};
use tracing::trace;

use super::cache::{
    BuildContext, FieldDef, PendingResource, SchemaType, TypeId, TypeKey, TypeKind,
};
use super::naming::resource_type_name;
use crate::error::GraphQLError;

/// Name of the scalar used for opaque arrays and iterables.
pub const ITERABLE_SCALAR: &str = "Iterable";

/// Classes exposed as plain strings.
const DATE_TIME_CLASSES: &[&str] = &[
    "DateTime",
    "DateTimeImmutable",
    "DateTimeInterface",
    "Date",
    "Time",
    "Instant",
    "OffsetDateTime",
    "NaiveDate",
    "NaiveDateTime",
    "time::OffsetDateTime",
    "time::PrimitiveDateTime",
    "time::Date",
];

/// What a converted type refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedKind {
    /// A builtin scalar, the `Iterable` scalar, or a reference rendered as a
    /// string.
    Scalar,
    /// A single resource object.
    Resource { class: String },
    /// A collection of resource objects, as a list or a connection.
    ResourceCollection { class: String },
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedType {
    pub type_ref: TypeRef,
    pub kind: ConvertedKind,
}

/// Context a type is converted in.
#[derive(Debug, Clone, Copy)]
pub struct ConversionTarget<'a> {
    /// Input position (mutation arguments).
    pub input: bool,
    /// Mutation the type belongs to, if any.
    pub mutation: Option<&'a str>,
    /// Nesting depth; root fields are at depth 0.
    pub depth: usize,
}

impl<'a> ConversionTarget<'a> {
    /// Output position of a query.
    #[must_use]
    pub fn query(depth: usize) -> Self {
        Self {
            input: false,
            mutation: None,
            depth,
        }
    }

    /// Output position of a mutation payload.
    #[must_use]
    pub fn payload(mutation: &'a str, depth: usize) -> Self {
        Self {
            input: false,
            mutation: Some(mutation),
            depth,
        }
    }

    /// Input position of a mutation.
    #[must_use]
    pub fn input(mutation: Option<&'a str>, depth: usize) -> Self {
        Self {
            input: true,
            mutation,
            depth,
        }
    }

    /// Returns `true` for plain query output positions.
    #[must_use]
    pub fn is_query(&self) -> bool {
        !self.input && self.mutation.is_none()
    }
}

/// Converts property types into GraphQL types.
pub struct TypeConverter<'a> {
    metadata: &'a dyn MetadataProvider,
    pagination_enabled: bool,
}

impl<'a> TypeConverter<'a> {
    #[must_use]
    pub fn new(metadata: &'a dyn MetadataProvider, pagination_enabled: bool) -> Self {
        Self {
            metadata,
            pagination_enabled,
        }
    }

    /// Converts a property type.
    ///
    /// Returns `Ok(None)` when the type refers to a class that is not a
    /// GraphQL-exposed resource; the caller omits the field.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::UnsupportedType` for builtin kinds GraphQL
    /// cannot represent (`null`, `callable`, `resource`).
    pub fn convert(
        &self,
        ctx: &mut BuildContext,
        property_type: &PropertyType,
        target: ConversionTarget<'_>,
        location: &str,
    ) -> Result<Option<ConvertedType>, GraphQLError> {
        let (element, kind) = match property_type.builtin {
            BuiltinType::Bool => (TypeRef::named(TypeRef::BOOLEAN), ConvertedKind::Scalar),
            BuiltinType::Int => (TypeRef::named(TypeRef::INT), ConvertedKind::Scalar),
            BuiltinType::Float => (TypeRef::named(TypeRef::FLOAT), ConvertedKind::Scalar),
            BuiltinType::String => (TypeRef::named(TypeRef::STRING), ConvertedKind::Scalar),
            BuiltinType::Array | BuiltinType::Iterable => {
                (iterable_type_ref(ctx)?, ConvertedKind::Scalar)
            }
            BuiltinType::Object => {
                match self.convert_object(ctx, property_type, target)? {
                    Some(converted) => converted,
                    None => return Ok(None),
                }
            }
            BuiltinType::Null | BuiltinType::Callable | BuiltinType::Resource => {
                return Err(GraphQLError::unsupported_type(
                    property_type.builtin.as_str(),
                    location,
                ));
            }
        };

        let nullable = property_type.nullable || target.mutation == Some(UPDATE_OPERATION);
        let type_ref = if nullable {
            element
        } else {
            TypeRef::NonNull(Box::new(element))
        };

        Ok(Some(ConvertedType { type_ref, kind }))
    }

    fn convert_object(
        &self,
        ctx: &mut BuildContext,
        property_type: &PropertyType,
        target: ConversionTarget<'_>,
    ) -> Result<Option<(TypeRef, ConvertedKind)>, GraphQLError> {
        let collection = property_type.is_object_collection();

        if property_type.class_name.as_deref().is_some_and(is_date_time_class)
            || (target.input && target.depth > 0)
        {
            let string = TypeRef::named(TypeRef::STRING);
            return Ok(Some(if collection {
                (TypeRef::List(Box::new(string)), ConvertedKind::Scalar)
            } else {
                (string, ConvertedKind::Scalar)
            }));
        }

        let Some(class) = property_type.target_class() else {
            trace!("Object type without a class, omitting");
            return Ok(None);
        };

        let resource = match self.metadata.resource(class) {
            Ok(resource) if resource.is_graphql_exposed() => resource,
            Ok(_) => {
                trace!(class, "Resource is not exposed through GraphQL, omitting");
                return Ok(None);
            }
            Err(e) => {
                trace!(class, error = %e, "Class is not a resource, omitting");
                return Ok(None);
            }
        };

        let id = self.resource_object_type(ctx, &resource, target)?;
        let node = ctx.type_ref(id);

        if !collection {
            return Ok(Some((
                node,
                ConvertedKind::Resource {
                    class: resource.class.clone(),
                },
            )));
        }

        let type_ref = if self.pagination_enabled && target.is_query() {
            connection_type_ref(ctx, id)?
        } else {
            TypeRef::List(Box::new(node))
        };

        Ok(Some((
            type_ref,
            ConvertedKind::ResourceCollection {
                class: resource.class.clone(),
            },
        )))
    }

    /// Returns the object, input or payload type of a resource in the given
    /// context, declaring and queueing it on first request.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` on a type name collision.
    pub fn resource_object_type(
        &self,
        ctx: &mut BuildContext,
        resource: &ResourceMetadata,
        target: ConversionTarget<'_>,
    ) -> Result<TypeId, GraphQLError> {
        let nested = !target.input && target.mutation.is_some() && target.depth > 0;
        let key = TypeKey::Resource {
            class: resource.class.clone(),
            mutation: target.mutation.map(str::to_string),
            input: target.input,
            nested,
        };

        if let Some(id) = ctx.get(&key) {
            return Ok(id);
        }

        let name = resource_type_name(&resource.short_name, target.input, target.mutation, nested);
        let kind = if target.input {
            TypeKind::InputObject
        } else {
            TypeKind::Object
        };

        trace!(class = %resource.class, type_name = %name, "Declaring resource type");

        let schema_type = SchemaType::new(name, kind)
            .description(resource.description.clone())
            .resource(&resource.class, target.is_query());
        let id = ctx.declare(key, schema_type)?;

        ctx.enqueue(PendingResource {
            id,
            class: resource.class.clone(),
            mutation: target.mutation.map(str::to_string),
            input: target.input,
            depth: target.depth,
        });

        Ok(id)
    }
}

/// Returns `true` for classes rendered as strings.
///
/// Generic arguments are ignored, and every `chrono::` type counts.
#[must_use]
pub fn is_date_time_class(class: &str) -> bool {
    let base = class.split('<').next().unwrap_or(class).trim();
    base.starts_with("chrono::") || DATE_TIME_CLASSES.contains(&base)
}

/// Declares the `Iterable` scalar if needed and returns a reference to it.
fn iterable_type_ref(ctx: &mut BuildContext) -> Result<TypeRef, GraphQLError> {
    let id = ctx.declare(
        TypeKey::Scalar {
            name: ITERABLE_SCALAR.to_string(),
        },
        SchemaType::new(ITERABLE_SCALAR, TypeKind::Scalar)
            .description(Some(
                "The `Iterable` scalar type represents an array or a Traversable with any kind of data.",
            )),
    )?;
    Ok(ctx.type_ref(id))
}

/// Declares the Relay connection of a node type (with its edge and page
/// info types) and returns a reference to it.
///
/// ```graphql
/// type BookConnection { edges: [BookEdge], pageInfo: BookPageInfo! }
/// type BookEdge { node: Book, cursor: String! }
/// type BookPageInfo { endCursor: String, hasNextPage: Boolean! }
/// ```
fn connection_type_ref(ctx: &mut BuildContext, node: TypeId) -> Result<TypeRef, GraphQLError> {
    let node_name = ctx.get_type(node).name.clone();

    let connection_key = TypeKey::Connection {
        node: node_name.clone(),
    };
    if let Some(id) = ctx.get(&connection_key) {
        return Ok(ctx.type_ref(id));
    }

    let edge = ctx.declare(
        TypeKey::Edge {
            node: node_name.clone(),
        },
        SchemaType::new(format!("{node_name}Edge"), TypeKind::Edge)
            .description(Some(format!("Edge of {node_name}."))),
    )?;
    ctx.populate(
        edge,
        vec![
            FieldDef::new("node", TypeRef::named(&node_name)),
            FieldDef::new("cursor", TypeRef::named_nn(TypeRef::STRING)),
        ],
    );

    let page_info = ctx.declare(
        TypeKey::PageInfo {
            node: node_name.clone(),
        },
        SchemaType::new(format!("{node_name}PageInfo"), TypeKind::PageInfo)
            .description(Some("Information about the current page.")),
    )?;
    ctx.populate(
        page_info,
        vec![
            FieldDef::new("endCursor", TypeRef::named(TypeRef::STRING)),
            FieldDef::new("hasNextPage", TypeRef::named_nn(TypeRef::BOOLEAN)),
        ],
    );

    let connection = ctx.declare(
        connection_key,
        SchemaType::new(format!("{node_name}Connection"), TypeKind::Connection)
            .description(Some(format!("Connection for {node_name}."))),
    )?;
    ctx.populate(
        connection,
        vec![
            FieldDef::new("edges", TypeRef::List(Box::new(ctx.type_ref(edge)))),
            FieldDef::new(
                "pageInfo",
                TypeRef::NonNull(Box::new(ctx.type_ref(page_info))),
            ),
        ],
    );

    Ok(ctx.type_ref(connection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_metadata::{InMemoryMetadataProvider, OperationConfig, PropertyMetadata};

    fn provider() -> InMemoryMetadataProvider {
        InMemoryMetadataProvider::new()
            .with_resource(
                ResourceMetadata::new("app::Book", "Book")
                    .with_operation("query", OperationConfig::new()),
                vec![PropertyMetadata::new(
                    "title",
                    PropertyType::new(BuiltinType::String, false),
                )],
            )
            .with_resource(ResourceMetadata::new("app::Hidden", "Hidden"), vec![])
    }

    fn convert(
        provider: &InMemoryMetadataProvider,
        ctx: &mut BuildContext,
        property_type: &PropertyType,
        target: ConversionTarget<'_>,
    ) -> Option<ConvertedType> {
        TypeConverter::new(provider, true)
            .convert(ctx, property_type, target, "Test.field")
            .unwrap()
    }

    #[test]
    fn test_builtin_scalars() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let converted = convert(
            &provider,
            &mut ctx,
            &PropertyType::new(BuiltinType::Int, false),
            ConversionTarget::query(1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "Int!");
        assert_eq!(converted.kind, ConvertedKind::Scalar);

        let converted = convert(
            &provider,
            &mut ctx,
            &PropertyType::new(BuiltinType::Bool, true),
            ConversionTarget::query(1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "Boolean");
    }

    #[test]
    fn test_update_mutation_is_always_nullable() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let converted = convert(
            &provider,
            &mut ctx,
            &PropertyType::new(BuiltinType::String, false),
            ConversionTarget::input(Some("update"), 1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "String");
    }

    #[test]
    fn test_iterable_scalar_declared_once() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        for builtin in [BuiltinType::Array, BuiltinType::Iterable] {
            let converted = convert(
                &provider,
                &mut ctx,
                &PropertyType::new(builtin, true),
                ConversionTarget::query(1),
            )
            .unwrap();
            assert_eq!(converted.type_ref.to_string(), "Iterable");
        }
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_unsupported_builtin_is_an_error() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let err = TypeConverter::new(&provider, true)
            .convert(
                &mut ctx,
                &PropertyType::new(BuiltinType::Callable, false),
                ConversionTarget::query(1),
                "Book.cover",
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The type \"callable\" of Book.cover is not supported"
        );
    }

    #[test]
    fn test_unknown_and_hidden_classes_are_omitted() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        for class in ["app::Unknown", "app::Hidden"] {
            assert!(
                convert(
                    &provider,
                    &mut ctx,
                    &PropertyType::object(class, true),
                    ConversionTarget::query(1),
                )
                .is_none()
            );
        }
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_date_time_and_nested_input_become_strings() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let converted = convert(
            &provider,
            &mut ctx,
            &PropertyType::object("DateTime", false),
            ConversionTarget::query(1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "String!");

        let converted = convert(
            &provider,
            &mut ctx,
            &PropertyType::object("app::Book", true),
            ConversionTarget::input(Some("create"), 1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "String");
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_date_time_classes() {
        for class in DATE_TIME_CLASSES {
            assert!(is_date_time_class(class), "{class} should be a date-time class");
        }
        assert!(is_date_time_class("chrono::DateTime<Utc>"));
        assert!(is_date_time_class("chrono::DateTime<chrono::FixedOffset>"));
        assert!(is_date_time_class("chrono::NaiveTime"));
        assert!(!is_date_time_class("app::Book"));
        assert!(!is_date_time_class("app::DateTimeRange"));
    }

    #[test]
    fn test_generic_chrono_property_becomes_string() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let converted = convert(
            &provider,
            &mut ctx,
            &PropertyType::object("chrono::DateTime<Utc>", true),
            ConversionTarget::query(1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "String");
        assert_eq!(converted.kind, ConvertedKind::Scalar);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_resource_reference_is_declared_and_queued_once() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let first = convert(
            &provider,
            &mut ctx,
            &PropertyType::object("app::Book", true),
            ConversionTarget::query(1),
        )
        .unwrap();
        let second = convert(
            &provider,
            &mut ctx,
            &PropertyType::object("app::Book", false),
            ConversionTarget::query(2),
        )
        .unwrap();

        assert_eq!(first.type_ref.to_string(), "Book");
        assert_eq!(second.type_ref.to_string(), "Book!");
        assert_eq!(
            first.kind,
            ConvertedKind::Resource {
                class: "app::Book".into()
            }
        );
        assert_eq!(ctx.len(), 1);
        assert!(ctx.pop_pending().is_some());
        assert!(ctx.pop_pending().is_none());
    }

    #[test]
    fn test_collections_become_connections_in_queries_only() {
        let provider = provider();
        let mut ctx = BuildContext::new();
        let books = PropertyType::collection_of("app::Book", false);

        let converted = convert(&provider, &mut ctx, &books, ConversionTarget::query(0)).unwrap();
        assert_eq!(converted.type_ref.to_string(), "BookConnection!");
        assert!(ctx.find_by_name("BookEdge").is_some());
        assert!(ctx.find_by_name("BookPageInfo").is_some());

        let converted = convert(
            &provider,
            &mut ctx,
            &books,
            ConversionTarget::payload("create", 1),
        )
        .unwrap();
        assert_eq!(converted.type_ref.to_string(), "[createBookNestedPayload]!");
    }

    #[test]
    fn test_collections_are_lists_without_pagination() {
        let provider = provider();
        let mut ctx = BuildContext::new();

        let converted = TypeConverter::new(&provider, false)
            .convert(
                &mut ctx,
                &PropertyType::collection_of("app::Book", false),
                ConversionTarget::query(0),
                "Query.books",
            )
            .unwrap()
            .unwrap();
        assert_eq!(converted.type_ref.to_string(), "[Book]!");
        assert_eq!(
            converted.kind,
            ConvertedKind::ResourceCollection {
                class: "app::Book".into()
            }
        );
    }

    #[test]
    fn test_payload_naming_by_depth() {
        let provider = provider();
        let mut ctx = BuildContext::new();
        let book = PropertyType::object("app::Book", true);

        let root =
            convert(&provider, &mut ctx, &book, ConversionTarget::payload("create", 0)).unwrap();
        let nested =
            convert(&provider, &mut ctx, &book, ConversionTarget::payload("create", 1)).unwrap();
        let input = convert(
            &provider,
            &mut ctx,
            &book,
            ConversionTarget::input(Some("create"), 0),
        )
        .unwrap();

        assert_eq!(root.type_ref.to_string(), "createBookPayload");
        assert_eq!(nested.type_ref.to_string(), "createBookNestedPayload");
        assert_eq!(input.type_ref.to_string(), "createBookInput");
        assert_eq!(
            ctx.find_by_name("createBookInput").unwrap().kind,
            TypeKind::InputObject
        );
        assert!(!ctx.find_by_name("createBookPayload").unwrap().implements_node);
    }
}
