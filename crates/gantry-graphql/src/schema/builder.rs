//! Resource GraphQL schema builder.
//!
//! `ResourceSchemaBuilder` walks every GraphQL-exposed resource known to the
//! metadata provider and synthesizes:
//! - `Query.node(id: ID!): Node`
//! - `Query.book(id: ID): Book` and `Query.books(first, after, ...filters)`
//! - `Mutation.{operation}{ShortName}(input: ...Input!): ...Payload` for
//!   every configured operation other than `query`
//!
//! Building happens in two steps. [`ResourceSchemaBuilder::build_types`]
//! computes the complete type graph in a [`BuildContext`];
//! [`ResourceSchemaBuilder::build`] then materializes it into an
//! async-graphql dynamic schema with resolvers attached.

use std::sync::Arc;

use async_graphql::dynamic::{
    Field, InputObject, InputValue, Object, Scalar, Schema, SchemaBuilder, TypeRef,
};
use gantry_metadata::{
    CREATE_OPERATION, DELETE_OPERATION, DynFilterLocator, DynMetadataProvider, PropertyType,
    QUERY_OPERATION, ResourceMetadata,
};
use tracing::{debug, trace};

use super::cache::{
    ArgumentDef, BuildContext, FieldDef, FieldResolution, PendingResource, ResolverBinding,
    SchemaType, TypeKind,
};
use super::converter::{ConversionTarget, ConvertedKind, TypeConverter};
use super::filters::{FilterArgs, materialize_filter_args, merge_filter_key};
use super::naming::{
    collection_field_name, item_field_name, mutation_description, mutation_field_name,
    property_field_name,
};
use super::node::{NODE_INTERFACE, NodeTypeTable, node_interface};
use crate::error::GraphQLError;
use crate::resolvers::{
    CLIENT_MUTATION_ID, CollectionResolverFactory, DynResolverLocator, InMemoryResolverLocator,
    ItemMutationResolverFactory, ItemResolverFactory, PaginationOptions, ResolverPipeline,
    ResolverStages, property_resolver,
};

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Wrap query collections in Relay connections.
    pub pagination_enabled: bool,

    /// Page size when `first` is not given.
    pub default_page_size: usize,

    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            pagination_enabled: true,
            default_page_size: 30,
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// Fully populated type graph of one build.
#[derive(Debug)]
pub struct SchemaTypes {
    /// Every synthesized type.
    pub context: BuildContext,
    /// Fields of the `Query` root.
    pub query_fields: Vec<FieldDef>,
    /// Fields of the `Mutation` root; the root is omitted when empty.
    pub mutation_fields: Vec<FieldDef>,
}

impl SchemaTypes {
    /// Returns the synthesized type with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.context.find_by_name(name)
    }

    #[must_use]
    pub fn query_field(&self, name: &str) -> Option<&FieldDef> {
        self.query_fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn mutation_field(&self, name: &str) -> Option<&FieldDef> {
        self.mutation_fields.iter().find(|field| field.name == name)
    }
}

/// Builds a GraphQL schema from resource metadata.
///
/// # Example
///
/// ```ignore
/// let builder = ResourceSchemaBuilder::new(
///     metadata,
///     filters,
///     stages,
///     SchemaBuilderConfig::default(),
/// )
/// .with_resolver_locator(locator);
///
/// let schema = builder.build()?;
/// ```
pub struct ResourceSchemaBuilder {
    metadata: DynMetadataProvider,
    filters: DynFilterLocator,
    stages: ResolverStages,
    locator: DynResolverLocator,
    config: SchemaBuilderConfig,
}

impl ResourceSchemaBuilder {
    /// Creates a new schema builder without custom resolvers.
    #[must_use]
    pub fn new(
        metadata: DynMetadataProvider,
        filters: DynFilterLocator,
        stages: ResolverStages,
        config: SchemaBuilderConfig,
    ) -> Self {
        Self {
            metadata,
            filters,
            stages,
            locator: Arc::new(InMemoryResolverLocator::new()),
            config,
        }
    }

    /// Sets the locator of custom item, collection and mutation resolvers.
    #[must_use]
    pub fn with_resolver_locator(mut self, locator: DynResolverLocator) -> Self {
        self.locator = locator;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SchemaBuilderConfig {
        &self.config
    }

    /// Builds the GraphQL schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a property type is unsupported, a metadata lookup
    /// fails, or async-graphql rejects the synthesized schema.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        debug!("Starting GraphQL schema build");

        let types = self.build_types()?;
        let node_types = Arc::new(NodeTypeTable::from_context(&types.context));
        let pipeline = Arc::new(
            ResolverPipeline::new(self.stages.clone(), Arc::clone(&self.metadata))
                .with_locator(Arc::clone(&self.locator))
                .with_pagination(PaginationOptions {
                    enabled: self.config.pagination_enabled,
                    default_page_size: self.config.default_page_size,
                })
                .with_node_types(node_types),
        );

        let has_mutations = !types.mutation_fields.is_empty();
        let mut schema_builder = Schema::build("Query", has_mutations.then_some("Mutation"), None)
            .register(node_interface());

        for (_, schema_type) in types.context.types() {
            schema_builder = register_type(schema_builder, schema_type, &pipeline);
        }

        schema_builder =
            schema_builder.register(root_object("Query", &types.query_fields, &pipeline));
        if has_mutations {
            schema_builder =
                schema_builder.register(root_object("Mutation", &types.mutation_fields, &pipeline));
        }

        // Configure limits
        let mut schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!(
            types = types.context.len(),
            query_fields = types.query_fields.len(),
            mutation_fields = types.mutation_fields.len(),
            "GraphQL schema build complete"
        );
        Ok(schema)
    }

    /// Computes the complete type graph without materializing it.
    ///
    /// # Errors
    ///
    /// Returns an error if a property type is unsupported or a metadata
    /// lookup fails.
    pub fn build_types(&self) -> Result<SchemaTypes, GraphQLError> {
        let mut ctx = BuildContext::new();
        let mut query_fields = vec![node_field()];
        let mut mutation_fields = Vec::new();

        for class in self.metadata.resource_classes() {
            let resource = self.metadata.resource(&class)?;
            if !resource.is_graphql_exposed() {
                trace!(class = %class, "Resource is not exposed through GraphQL, skipping");
                continue;
            }

            if resource.operation(QUERY_OPERATION).is_some() {
                query_fields.extend(self.query_fields(&mut ctx, &resource)?);
            }
            mutation_fields.extend(self.mutation_fields(&mut ctx, &resource)?);
        }

        while let Some(pending) = ctx.pop_pending() {
            let fields = self.resource_fields(&mut ctx, &pending)?;
            ctx.populate(pending.id, fields);
        }

        let unpopulated = ctx.unpopulated();
        if !unpopulated.is_empty() {
            return Err(GraphQLError::SchemaBuildFailed(format!(
                "types without fields: {}",
                unpopulated.join(", ")
            )));
        }

        Ok(SchemaTypes {
            context: ctx,
            query_fields,
            mutation_fields,
        })
    }

    fn converter(&self) -> TypeConverter<'_> {
        TypeConverter::new(self.metadata.as_ref(), self.config.pagination_enabled)
    }

    /// `book(id: ID)` and `books(...)` for a resource with a `query`
    /// operation.
    fn query_fields(
        &self,
        ctx: &mut BuildContext,
        resource: &ResourceMetadata,
    ) -> Result<Vec<FieldDef>, GraphQLError> {
        let config = resource.operation(QUERY_OPERATION);
        let description = config
            .and_then(|config| config.description.clone())
            .or_else(|| resource.description.clone());
        let deprecation_reason = config.and_then(|config| config.deprecation_reason.clone());

        let mut fields = Vec::with_capacity(2);

        let item_name = item_field_name(&resource.short_name);
        let item_type = PropertyType::object(&resource.class, true);
        if let Some(field) = self.field_configuration(
            ctx,
            &item_name,
            &resource.class,
            &item_type,
            ConversionTarget::query(0),
        )? {
            let mut field = field.argument(ArgumentDef::new("id", TypeRef::named(TypeRef::ID)));
            field.description.clone_from(&description);
            field.deprecation_reason.clone_from(&deprecation_reason);
            fields.push(field);
        }

        let collection_name = collection_field_name(&resource.short_name);
        let collection_type = PropertyType::collection_of(&resource.class, false);
        if let Some(mut field) = self.field_configuration(
            ctx,
            &collection_name,
            &resource.class,
            &collection_type,
            ConversionTarget::query(0),
        )? {
            field.description = description;
            field.deprecation_reason = deprecation_reason;
            fields.push(field);
        }

        Ok(fields)
    }

    /// `{operation}{ShortName}(input: ...)` for every non-query operation.
    fn mutation_fields(
        &self,
        ctx: &mut BuildContext,
        resource: &ResourceMetadata,
    ) -> Result<Vec<FieldDef>, GraphQLError> {
        let resource_type = PropertyType::object(&resource.class, true);
        let mut fields = Vec::new();

        for operation in resource.operation_names() {
            if operation == QUERY_OPERATION {
                continue;
            }

            let name = mutation_field_name(operation, &resource.short_name);
            let Some(payload) = self.field_configuration(
                ctx,
                &name,
                &resource.class,
                &resource_type,
                ConversionTarget::payload(operation, 0),
            )?
            else {
                continue;
            };

            let Some(input) = self.converter().convert(
                ctx,
                &resource_type,
                ConversionTarget::input(Some(operation), 0),
                &format!("Mutation.{name}"),
            )?
            else {
                continue;
            };

            let config = resource.operation(operation);
            let mut field = payload
                .argument(ArgumentDef::new("input", TypeRef::NonNull(Box::new(input.type_ref))))
                .resolution(FieldResolution::Mutation(
                    ResolverBinding::new(&resource.class).with_operation(operation),
                ));
            field.description = Some(
                config
                    .and_then(|config| config.description.clone())
                    .unwrap_or_else(|| mutation_description(operation, &resource.short_name)),
            );
            field.deprecation_reason = config.and_then(|config| config.deprecation_reason.clone());

            trace!(field = %name, "Adding mutation field");
            fields.push(field);
        }

        Ok(fields)
    }

    /// Computes the fields of a queued resource type.
    fn resource_fields(
        &self,
        ctx: &mut BuildContext,
        pending: &PendingResource,
    ) -> Result<Vec<FieldDef>, GraphQLError> {
        let mutation = pending.mutation.as_deref();
        let id_field = FieldDef::new("id", TypeRef::named_nn(TypeRef::ID));

        if mutation == Some(DELETE_OPERATION) {
            return Ok(vec![id_field, client_mutation_id_field(pending.input)]);
        }

        let mut fields = Vec::new();
        if !(pending.input && mutation == Some(CREATE_OPERATION)) {
            fields.push(id_field);
        }

        let resource = self.metadata.resource(&pending.class)?;
        let target = ConversionTarget {
            input: pending.input,
            mutation,
            depth: pending.depth + 1,
        };

        for property_name in self.metadata.property_names(&pending.class)? {
            let property = self.metadata.property(&pending.class, &property_name)?;
            let Some(property_type) = &property.property_type else {
                trace!(property = %property_name, "Property has no type, skipping");
                continue;
            };

            let exposed = if target.is_query() {
                property.readable
            } else {
                property.writable
            };
            if !exposed {
                continue;
            }

            let name = property_field_name(&property_name);
            if let Some(mut field) =
                self.field_configuration(ctx, &name, &pending.class, property_type, target)?
            {
                field.description.clone_from(&property.description);
                field.deprecation_reason.clone_from(&property.deprecation_reason);
                fields.push(field);
            }
        }

        if mutation.is_some() {
            fields.push(client_mutation_id_field(pending.input));
        }

        trace!(
            type_name = %ctx.get_type(pending.id).name,
            class = %resource.class,
            fields = fields.len(),
            "Populated resource type"
        );
        Ok(fields)
    }

    /// Converts a property type into a field, attaching arguments and a
    /// resolver.
    fn field_configuration(
        &self,
        ctx: &mut BuildContext,
        name: &str,
        root_class: &str,
        property_type: &PropertyType,
        target: ConversionTarget<'_>,
    ) -> Result<Option<FieldDef>, GraphQLError> {
        let location = format!("{}.{name}", gantry_metadata::short_class_name(root_class));
        let Some(converted) = self
            .converter()
            .convert(ctx, property_type, target, &location)?
        else {
            return Ok(None);
        };

        let mut field = FieldDef::new(name, converted.type_ref);
        if !target.is_query() {
            return Ok(Some(field));
        }

        field.resolution = match converted.kind {
            ConvertedKind::Scalar => FieldResolution::Property,
            ConvertedKind::Resource { class } => {
                FieldResolution::Item(ResolverBinding::new(class).with_root(root_class))
            }
            ConvertedKind::ResourceCollection { class } => {
                if self.config.pagination_enabled {
                    field.arguments.push(ArgumentDef::new("first", TypeRef::named(TypeRef::INT)));
                    field
                        .arguments
                        .push(ArgumentDef::new("after", TypeRef::named(TypeRef::STRING)));
                }
                field
                    .arguments
                    .extend(self.filter_arguments(ctx, &class, target.depth)?);
                FieldResolution::Collection(ResolverBinding::new(class).with_root(root_class))
            }
        };

        Ok(Some(field))
    }

    /// Builds the filter arguments of a collection of `resource_class`.
    fn filter_arguments(
        &self,
        ctx: &mut BuildContext,
        resource_class: &str,
        depth: usize,
    ) -> Result<Vec<ArgumentDef>, GraphQLError> {
        let resource = self.metadata.resource(resource_class)?;
        let mut args = FilterArgs::new();

        for filter_id in resource.query_filters() {
            if !self.filters.has(filter_id) {
                debug!(filter = %filter_id, class = %resource_class, "Unknown filter, skipping");
                continue;
            }
            let Some(description) = self.filters.description(filter_id, resource_class) else {
                continue;
            };

            for (key, parameter) in description {
                let property_type =
                    PropertyType::from_type_name(&parameter.type_name, !parameter.required);
                let Some(converted) = self.converter().convert(
                    ctx,
                    &property_type,
                    ConversionTarget::input(None, depth.max(1)),
                    &format!("filter {filter_id}"),
                )?
                else {
                    continue;
                };
                merge_filter_key(&mut args, &resource.short_name, &key, converted.type_ref);
            }
        }

        materialize_filter_args(ctx, args)
    }
}

fn node_field() -> FieldDef {
    FieldDef::new("node", TypeRef::named(NODE_INTERFACE))
        .description("Fetches an object given its ID.")
        .argument(ArgumentDef::new("id", TypeRef::named_nn(TypeRef::ID)))
        .resolution(FieldResolution::Item(ResolverBinding::default()))
}

fn client_mutation_id_field(input: bool) -> FieldDef {
    let type_ref = if input {
        TypeRef::named_nn(TypeRef::STRING)
    } else {
        TypeRef::named(TypeRef::STRING)
    };
    FieldDef::new(CLIENT_MUTATION_ID, type_ref)
}

/// Registers one synthesized type.
fn register_type(
    builder: SchemaBuilder,
    schema_type: &SchemaType,
    pipeline: &Arc<ResolverPipeline>,
) -> SchemaBuilder {
    match schema_type.kind {
        TypeKind::Scalar => {
            let mut scalar = Scalar::new(&schema_type.name);
            if let Some(description) = &schema_type.description {
                scalar = scalar.description(description);
            }
            builder.register(scalar)
        }
        TypeKind::InputObject | TypeKind::Filter => {
            let mut input = InputObject::new(&schema_type.name);
            if let Some(description) = &schema_type.description {
                input = input.description(description);
            }
            for field in &schema_type.fields {
                let mut value = InputValue::new(&field.name, field.type_ref.clone());
                if let Some(description) = &field.description {
                    value = value.description(description);
                }
                input = input.field(value);
            }
            builder.register(input)
        }
        TypeKind::Object | TypeKind::Connection | TypeKind::Edge | TypeKind::PageInfo => {
            let mut object = root_object(&schema_type.name, &schema_type.fields, pipeline);
            if let Some(description) = &schema_type.description {
                object = object.description(description);
            }
            if schema_type.implements_node {
                object = object.implement(NODE_INTERFACE);
            }
            builder.register(object)
        }
    }
}

fn root_object(name: &str, fields: &[FieldDef], pipeline: &Arc<ResolverPipeline>) -> Object {
    fields
        .iter()
        .fold(Object::new(name), |object, field| object.field(build_field(field, pipeline)))
}

/// Materializes a field with its resolver.
fn build_field(def: &FieldDef, pipeline: &Arc<ResolverPipeline>) -> Field {
    let name = def.name.as_str();
    let type_ref = def.type_ref.clone();

    let mut field = match &def.resolution {
        FieldResolution::Property => {
            Field::new(name, type_ref, property_resolver(def.name.clone()))
        }
        FieldResolution::Item(binding) => Field::new(
            name,
            type_ref,
            ItemResolverFactory::create(Arc::clone(pipeline), binding.clone()),
        ),
        FieldResolution::Collection(binding) => Field::new(
            name,
            type_ref,
            CollectionResolverFactory::create(Arc::clone(pipeline), binding.clone()),
        ),
        FieldResolution::Mutation(binding) => Field::new(
            name,
            type_ref,
            ItemMutationResolverFactory::create(Arc::clone(pipeline), binding.clone()),
        ),
    };

    if let Some(description) = &def.description {
        field = field.description(description);
    }
    if let Some(reason) = &def.deprecation_reason {
        field = field.deprecation(Some(reason.as_str()));
    }
    for argument in &def.arguments {
        let mut value = InputValue::new(&argument.name, argument.type_ref.clone());
        if let Some(description) = &argument.description {
            value = value.description(description);
        }
        field = field.argument(value);
    }

    field
}
