//! Item mutation resolution: `createBook(input:)`, `deleteBook(input:)`...

use gantry_metadata::DELETE_OPERATION;
use serde_json::Value;
use tracing::debug;

use super::context::StageContext;
use super::error::{MismatchSource, PipelineError};
use super::pipeline::ResolverPipeline;
use crate::schema::node::item_resource_class;

/// Payload key echoing the client's mutation identifier.
pub const CLIENT_MUTATION_ID: &str = "clientMutationId";

impl ResolverPipeline {
    /// Resolves a mutation on a single item.
    ///
    /// Returns `Ok(None)` without running any stage when the field is not
    /// bound to a resource class and operation.
    ///
    /// Deletes run read, security, write and serialize. Other operations
    /// run read, deserialize, the configured custom mutation resolver,
    /// security, then validate and write when an item remains, and finally
    /// serialize. The input's `clientMutationId` is copied onto the payload.
    ///
    /// # Errors
    ///
    /// Fails when the read stage returns a non-object, when a custom
    /// resolver returns an item of another class, or when a stage fails.
    pub async fn resolve_item_mutation(
        &self,
        resource_class: Option<&str>,
        operation: Option<&str>,
        mut context: StageContext,
    ) -> Result<Option<Value>, PipelineError> {
        let (Some(resource_class), Some(operation)) = (resource_class, operation) else {
            return Ok(None);
        };
        context.is_mutation = true;

        debug!(
            field = %context.field_name,
            resource_class,
            operation,
            "Resolving item mutation"
        );

        let item = self
            .read_item(Some(resource_class), None, operation, &context)
            .await?;
        let previous_item = item.clone();

        if operation == DELETE_OPERATION {
            context.set_extra_variables(item.clone(), previous_item);
            self.stages
                .deny_access
                .deny_access(resource_class, operation, &context)
                .await?;

            let deleted = self
                .stages
                .write
                .write(item, resource_class, operation, &context)
                .await?;
            let payload = self
                .stages
                .serialize
                .serialize(deleted.as_ref(), resource_class, operation, &context)
                .await?;
            return Ok(with_client_mutation_id(payload, &context));
        }

        let mut item = self
            .stages
            .deserialize
            .deserialize(item, resource_class, operation, &context)
            .await?;

        let resource = self.resource(resource_class)?;
        if let Some(resolver_id) = resource
            .operation(operation)
            .and_then(|config| config.mutation.as_deref())
        {
            let resolver = self.mutation_resolver(resolver_id)?;
            item = resolver.resolve(item, &context).await?;

            if let Some(actual) = item.as_ref().and_then(item_resource_class)
                && actual != resource_class
            {
                return Err(PipelineError::mismatch(
                    MismatchSource::MutationResolver(resolver_id.to_string()),
                    resource_class,
                    actual,
                ));
            }
        }

        context.set_extra_variables(item.clone(), previous_item);
        self.stages
            .deny_access
            .deny_access(resource_class, operation, &context)
            .await?;

        let mut persisted = None;
        if let Some(current) = &item {
            self.stages
                .validate
                .validate(current, resource_class, operation, &context)
                .await?;
            persisted = self
                .stages
                .write
                .write(Some(current.clone()), resource_class, operation, &context)
                .await?;
        }

        let payload = self
            .stages
            .serialize
            .serialize(persisted.as_ref().or(item.as_ref()), resource_class, operation, &context)
            .await?;

        Ok(with_client_mutation_id(payload, &context))
    }
}

/// Copies the input's `clientMutationId` onto an object payload.
fn with_client_mutation_id(payload: Option<Value>, context: &StageContext) -> Option<Value> {
    let Some(client_mutation_id) = context.client_mutation_id() else {
        return payload;
    };

    match payload {
        Some(Value::Object(mut map)) => {
            map.insert(CLIENT_MUTATION_ID.to_string(), client_mutation_id.clone());
            Some(Value::Object(map))
        }
        other => other,
    }
}
