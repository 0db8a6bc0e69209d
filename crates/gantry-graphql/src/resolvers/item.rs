//! Item resolution: `book(id:)`, `node(id:)` and nested resource fields.

use gantry_metadata::QUERY_OPERATION;
use serde_json::Value;
use tracing::debug;

use super::context::StageContext;
use super::error::{MismatchSource, PipelineError};
use super::pipeline::{ResolverPipeline, resolve_resource_class};

impl ResolverPipeline {
    /// Resolves a single item.
    ///
    /// Runs read, the configured custom item query resolver, the security
    /// stage and serialize. `resource_class` is `None` for the `node` field,
    /// whose class is taken from the item envelope.
    ///
    /// # Errors
    ///
    /// Fails when the read stage returns a non-object, when the item's
    /// class disagrees with the field's class, or when a stage fails.
    pub async fn resolve_item(
        &self,
        resource_class: Option<&str>,
        root_class: Option<&str>,
        operation: Option<&str>,
        mut context: StageContext,
    ) -> Result<Option<Value>, PipelineError> {
        let operation = operation.unwrap_or(QUERY_OPERATION);

        debug!(
            field = %context.field_name,
            resource_class = ?resource_class,
            operation,
            "Resolving item"
        );

        let mut item = self
            .read_item(resource_class, root_class, operation, &context)
            .await?;
        let mut resource_class =
            resolve_resource_class(item.as_ref(), resource_class, MismatchSource::Read)?;
        let previous_item = item.clone();

        let resource = self.resource(&resource_class)?;
        if let Some(resolver_id) = resource
            .operation(operation)
            .and_then(|config| config.item_query.as_deref())
        {
            let resolver = self.query_resolver(resolver_id)?;
            item = resolver.resolve(item, &context).await?;
            resource_class = resolve_resource_class(
                item.as_ref(),
                Some(&resource_class),
                MismatchSource::QueryResolver(resolver_id.to_string()),
            )?;
        }

        context.set_extra_variables(item.clone(), previous_item);
        self.stages
            .deny_access
            .deny_access(&resource_class, operation, &context)
            .await?;

        let serialized = self
            .stages
            .serialize
            .serialize(item.as_ref(), &resource_class, operation, &context)
            .await?;

        Ok(serialized)
    }
}
