//! Resolver closures attached to synthesized fields.
//!
//! Each factory binds a resource class (and root class, operation) into a
//! closure that adapts the async-graphql resolver context to the
//! [`ResolverPipeline`].

use std::sync::Arc;

use async_graphql::{Name, Value};
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use tracing::trace;

use super::context::StageContext;
use super::error::PipelineError;
use super::pipeline::ResolverPipeline;
use super::value::{graphql_value_to_json, json_to_graphql_value};
use crate::schema::cache::ResolverBinding;

/// Returns the value already present on the parent object under the field
/// name.
///
/// Only non-null values of object parents count; root fields and missing
/// keys run the pipeline.
pub(crate) fn prefetched_value<'a>(ctx: &'a ResolverContext<'_>) -> Option<&'a Value> {
    match ctx.parent_value.as_value() {
        Some(Value::Object(parent)) => parent
            .get(&Name::new(ctx.field().name()))
            .filter(|value| !matches!(value, Value::Null)),
        _ => None,
    }
}

/// Creates a resolver that reads the field from the parent object.
pub fn property_resolver(
    field_name: String,
) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
    move |ctx| {
        let field_name = field_name.clone();
        FieldFuture::new(async move {
            if let Some(Value::Object(parent)) = ctx.parent_value.as_value()
                && let Some(value) = parent.get(&Name::new(&field_name))
            {
                return Ok(Some(FieldValue::value(value.clone())));
            }
            Ok(None::<FieldValue<'_>>)
        })
    }
}

/// Resolvers for single resource fields and the `node` field.
pub struct ItemResolverFactory;

impl ItemResolverFactory {
    /// Creates an item resolver.
    ///
    /// When the binding has no resource class the field returns the `Node`
    /// interface, and results are tagged with their concrete type.
    pub fn create(
        pipeline: Arc<ResolverPipeline>,
        binding: ResolverBinding,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let pipeline = Arc::clone(&pipeline);
            let binding = binding.clone();
            FieldFuture::new(async move {
                let interface = binding.resource_class.is_none();

                if let Some(value) = prefetched_value(&ctx) {
                    trace!(field = %ctx.field().name(), "Using value from parent object");
                    let value = value.clone();
                    return Ok(Some(tag_node(&pipeline, value, interface)));
                }

                let context = StageContext::from_resolver(&ctx);
                let item = pipeline
                    .resolve_item(
                        binding.resource_class.as_deref(),
                        binding.root_class.as_deref(),
                        binding.operation.as_deref(),
                        context,
                    )
                    .await
                    .map_err(PipelineError::into_graphql_error)?;

                Ok(item.map(|item| tag_node(&pipeline, json_to_graphql_value(item), interface)))
            })
        }
    }
}

/// Resolvers for root mutation fields.
pub struct ItemMutationResolverFactory;

impl ItemMutationResolverFactory {
    pub fn create(
        pipeline: Arc<ResolverPipeline>,
        binding: ResolverBinding,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let pipeline = Arc::clone(&pipeline);
            let binding = binding.clone();
            FieldFuture::new(async move {
                let context = StageContext::from_resolver(&ctx).mutation();
                let payload = pipeline
                    .resolve_item_mutation(
                        binding.resource_class.as_deref(),
                        binding.operation.as_deref(),
                        context,
                    )
                    .await
                    .map_err(PipelineError::into_graphql_error)?;

                Ok(payload.map(|payload| FieldValue::value(json_to_graphql_value(payload))))
            })
        }
    }
}

/// Resolvers for resource collection fields.
pub struct CollectionResolverFactory;

impl CollectionResolverFactory {
    pub fn create(
        pipeline: Arc<ResolverPipeline>,
        binding: ResolverBinding,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let pipeline = Arc::clone(&pipeline);
            let binding = binding.clone();
            FieldFuture::new(async move {
                let Some(resource_class) = binding.resource_class.clone() else {
                    return Err(PipelineError::UnresolvedResourceClass.into_graphql_error());
                };

                let prefetched = match prefetched_value(&ctx) {
                    Some(Value::List(items)) => {
                        Some(items.iter().map(graphql_value_to_json).collect())
                    }
                    _ => None,
                };

                let context = StageContext::from_resolver(&ctx).collection();
                let result = match prefetched {
                    Some(items) => {
                        trace!(field = %ctx.field().name(), "Using collection from parent object");
                        pipeline.paginate_prefetched(items, &context)
                    }
                    None => {
                        pipeline
                            .resolve_collection(
                                &resource_class,
                                binding.root_class.as_deref(),
                                binding.operation.as_deref(),
                                context,
                            )
                            .await
                    }
                }
                .map_err(PipelineError::into_graphql_error)?;

                Ok(Some(FieldValue::value(json_to_graphql_value(result))))
            })
        }
    }
}

/// Wraps a value, tagging it with its concrete object type when the field
/// returns the `Node` interface.
fn tag_node(pipeline: &ResolverPipeline, value: Value, interface: bool) -> FieldValue<'static> {
    if !interface {
        return FieldValue::value(value);
    }

    let type_name = pipeline
        .node_types()
        .resolve_type(&graphql_value_to_json(&value))
        .map(str::to_string);

    match type_name {
        Some(type_name) => FieldValue::value(value).with_type(type_name),
        None => FieldValue::value(value),
    }
}
