//! Build context and type cache.
//!
//! Every type the schema builder synthesizes lives in an index-based arena
//! owned by a [`BuildContext`]. Types are memoized by a structural
//! [`TypeKey`]; asking for the same key twice yields the same [`TypeId`].
//!
//! Resource types are built in two phases: they are declared (name, kind,
//! cache entry) and queued first, and their field lists are computed later
//! when the queue is drained. A resource that references itself therefore
//! finds its own handle in the cache instead of recursing.

use std::collections::{HashMap, VecDeque};

use async_graphql::dynamic::TypeRef;

use crate::error::GraphQLError;

/// Handle of a type in the build arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    /// Position of the type in declaration order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Structural memoization key of a synthesized type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A resource object, input or payload type.
    Resource {
        class: String,
        mutation: Option<String>,
        input: bool,
        nested: bool,
    },
    /// Relay connection wrapping the named node type.
    Connection { node: String },
    /// Relay edge of the named node type.
    Edge { node: String },
    /// Page info of the named node type's connection.
    PageInfo { node: String },
    /// Nested filter input type.
    Filter { name: String },
    /// Custom scalar.
    Scalar { name: String },
}

/// What a synthesized type materializes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    InputObject,
    Connection,
    Edge,
    PageInfo,
    Filter,
}

impl TypeKind {
    /// Returns `true` for kinds that materialize as GraphQL input objects.
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, Self::InputObject | Self::Filter)
    }
}

/// Binding of a resolver to the resource it resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverBinding {
    /// Resource class the field resolves; `None` when it is discovered from
    /// the fetched item (the `node` field).
    pub resource_class: Option<String>,
    /// Resource class owning the field.
    pub root_class: Option<String>,
    /// Operation name; `None` defaults to `query`.
    pub operation: Option<String>,
}

impl ResolverBinding {
    #[must_use]
    pub fn new(resource_class: impl Into<String>) -> Self {
        Self {
            resource_class: Some(resource_class.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_root(mut self, root_class: impl Into<String>) -> Self {
        self.root_class = Some(root_class.into());
        self
    }

    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

/// How a field obtains its value when the query executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResolution {
    /// The value is read from the parent object under the field name.
    Property,
    /// Plain item resolution pipeline.
    Item(ResolverBinding),
    /// Collection resolution pipeline.
    Collection(ResolverBinding),
    /// Item mutation resolution pipeline.
    Mutation(ResolverBinding),
}

/// An argument of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDef {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
}

impl ArgumentDef {
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A field of an object type, or an input field of an input type.
///
/// Input fields ignore `arguments` and `resolution`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub arguments: Vec<ArgumentDef>,
    pub resolution: FieldResolution,
}

impl FieldDef {
    /// Creates a pass-through field.
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
            deprecation_reason: None,
            arguments: Vec::new(),
            resolution: FieldResolution::Property,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: ArgumentDef) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn resolution(mut self, resolution: FieldResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Returns the argument with the given name.
    #[must_use]
    pub fn find_argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.arguments.iter().find(|argument| argument.name == name)
    }
}

/// A synthesized type.
#[derive(Debug, Clone)]
pub struct SchemaType {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
    /// Set on query-variant resource object types.
    pub implements_node: bool,
    /// Resource class the type was synthesized from, if any.
    pub resource_class: Option<String>,
    populated: bool,
}

impl SchemaType {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            fields: Vec::new(),
            implements_node: false,
            resource_class: None,
            populated: kind == TypeKind::Scalar,
        }
    }

    #[must_use]
    pub fn description(mut self, description: Option<impl Into<String>>) -> Self {
        self.description = description.map(Into::into);
        self
    }

    #[must_use]
    pub fn resource(mut self, class: impl Into<String>, implements_node: bool) -> Self {
        self.resource_class = Some(class.into());
        self.implements_node = implements_node;
        self
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns the field names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Returns `true` once the field list has been computed.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.populated
    }
}

/// A resource type whose field list has not been computed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResource {
    pub id: TypeId,
    pub class: String,
    pub mutation: Option<String>,
    pub input: bool,
    pub depth: usize,
}

/// Explicit state of one schema build.
///
/// The context is append-only: a declared type keeps its name and handle
/// for the lifetime of the build. Rebuilding a schema starts from a fresh
/// context.
#[derive(Debug, Default)]
pub struct BuildContext {
    types: Vec<SchemaType>,
    cache: HashMap<TypeKey, TypeId>,
    names: HashMap<String, TypeId>,
    pending: VecDeque<PendingResource>,
}

impl BuildContext {
    /// Creates an empty build context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `key`.
    #[must_use]
    pub fn get(&self, key: &TypeKey) -> Option<TypeId> {
        self.cache.get(key).copied()
    }

    /// Declares a type under `key`, or returns the handle already cached
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::SchemaBuildFailed` if a different key already
    /// claimed the type name.
    pub fn declare(
        &mut self,
        key: TypeKey,
        schema_type: SchemaType,
    ) -> Result<TypeId, GraphQLError> {
        if let Some(id) = self.get(&key) {
            return Ok(id);
        }

        if self.names.contains_key(&schema_type.name) {
            return Err(GraphQLError::SchemaBuildFailed(format!(
                "type name \"{}\" is declared by two different types",
                schema_type.name
            )));
        }

        let id = TypeId(self.types.len());
        self.names.insert(schema_type.name.clone(), id);
        self.cache.insert(key, id);
        self.types.push(schema_type);
        Ok(id)
    }

    /// Returns the type behind a handle.
    ///
    /// Handles are only minted by this context, so the lookup cannot miss.
    #[must_use]
    pub fn get_type(&self, id: TypeId) -> &SchemaType {
        &self.types[id.0]
    }

    /// Returns the type declared under `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&SchemaType> {
        self.names.get(name).map(|id| self.get_type(*id))
    }

    /// Returns a nullable named reference to the type.
    #[must_use]
    pub fn type_ref(&self, id: TypeId) -> TypeRef {
        TypeRef::named(self.get_type(id).name.clone())
    }

    /// Stores the field list of a declared type.
    pub fn populate(&mut self, id: TypeId, fields: Vec<FieldDef>) {
        let schema_type = &mut self.types[id.0];
        schema_type.fields = fields;
        schema_type.populated = true;
    }

    /// Queues a declared resource type for population.
    pub fn enqueue(&mut self, pending: PendingResource) {
        self.pending.push_back(pending);
    }

    /// Takes the next resource type awaiting population.
    pub fn pop_pending(&mut self) -> Option<PendingResource> {
        self.pending.pop_front()
    }

    /// Iterates over all declared types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &SchemaType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(index, schema_type)| (TypeId(index), schema_type))
    }

    /// Returns the number of declared types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of declared types whose fields were never computed.
    #[must_use]
    pub fn unpopulated(&self) -> Vec<&str> {
        self.types
            .iter()
            .filter(|schema_type| !schema_type.populated)
            .map(|schema_type| schema_type.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_key(input: bool) -> TypeKey {
        TypeKey::Resource {
            class: "app::Book".into(),
            mutation: None,
            input,
            nested: false,
        }
    }

    #[test]
    fn test_declare_returns_cached_handle() {
        let mut ctx = BuildContext::new();

        let first = ctx
            .declare(book_key(false), SchemaType::new("Book", TypeKind::Object))
            .unwrap();
        let second = ctx
            .declare(book_key(false), SchemaType::new("Book", TypeKind::Object))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get(&book_key(false)), Some(first));
    }

    #[test]
    fn test_name_collision_is_rejected() {
        let mut ctx = BuildContext::new();
        ctx.declare(book_key(false), SchemaType::new("Book", TypeKind::Object))
            .unwrap();

        let err = ctx
            .declare(
                TypeKey::Filter { name: "Book".into() },
                SchemaType::new("Book", TypeKind::Filter),
            )
            .unwrap_err();
        assert!(matches!(err, GraphQLError::SchemaBuildFailed(_)));
    }

    #[test]
    fn test_two_phase_population() {
        let mut ctx = BuildContext::new();
        let id = ctx
            .declare(book_key(false), SchemaType::new("Book", TypeKind::Object))
            .unwrap();
        ctx.enqueue(PendingResource {
            id,
            class: "app::Book".into(),
            mutation: None,
            input: false,
            depth: 0,
        });

        assert_eq!(ctx.unpopulated(), vec!["Book"]);

        let pending = ctx.pop_pending().unwrap();
        assert_eq!(pending.id, id);
        assert!(ctx.pop_pending().is_none());

        ctx.populate(
            id,
            vec![FieldDef::new("parent", ctx.type_ref(id))],
        );
        assert!(ctx.unpopulated().is_empty());
        assert_eq!(ctx.get_type(id).field_names(), vec!["parent"]);
        assert_eq!(
            ctx.find_by_name("Book").unwrap().field("parent").unwrap().type_ref,
            TypeRef::named("Book")
        );
    }

    #[test]
    fn test_scalars_are_populated_on_declaration() {
        let mut ctx = BuildContext::new();
        ctx.declare(
            TypeKey::Scalar { name: "Iterable".into() },
            SchemaType::new("Iterable", TypeKind::Scalar),
        )
        .unwrap();
        assert!(ctx.unpopulated().is_empty());
    }

    #[test]
    fn test_kind_is_input() {
        assert!(TypeKind::InputObject.is_input());
        assert!(TypeKind::Filter.is_input());
        assert!(!TypeKind::Connection.is_input());
    }
}
