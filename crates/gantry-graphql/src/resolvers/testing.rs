//! Recording stages for pipeline unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gantry_metadata::{InMemoryMetadataProvider, OperationConfig, ResourceMetadata};
use serde_json::{Value, json};

use super::context::{ExtraVariables, StageContext};
use super::error::StageError;
use super::pipeline::ResolverPipeline;
use super::stages::{
    DenyAccessStage, DeserializeStage, ReadStage, ResolverStages, SerializeStage, StageResult,
    ValidateStage, WriteStage,
};

/// Stages that record every call and return configured values.
#[derive(Default)]
pub struct Fixture {
    pub read_result: Option<Value>,
    pub denial: Option<StageError>,
    pub violation: Option<StageError>,
    pub write_result: Option<Value>,
    pub calls: Mutex<Vec<String>>,
    pub security_variables: Mutex<Vec<ExtraVariables>>,
}

impl Fixture {
    pub fn reading(item: Value) -> Self {
        Self {
            read_result: Some(item),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn stages(self: &Arc<Self>) -> ResolverStages {
        ResolverStages {
            read: self.clone(),
            deny_access: self.clone(),
            deserialize: self.clone(),
            validate: self.clone(),
            write: self.clone(),
            serialize: self.clone(),
        }
    }
}

#[async_trait]
impl ReadStage for Fixture {
    async fn read(
        &self,
        _resource_class: Option<&str>,
        _root_class: Option<&str>,
        operation: &str,
        _context: &StageContext,
    ) -> StageResult<Option<Value>> {
        self.record(format!("read:{operation}"));
        Ok(self.read_result.clone())
    }
}

#[async_trait]
impl DenyAccessStage for Fixture {
    async fn deny_access(
        &self,
        _resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<()> {
        self.record(format!("deny_access:{operation}"));
        self.security_variables
            .lock()
            .unwrap()
            .push(context.extra_variables.clone());
        match &self.denial {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeserializeStage for Fixture {
    async fn deserialize(
        &self,
        item: Option<Value>,
        _resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<Option<Value>> {
        self.record(format!("deserialize:{operation}"));
        let mut item = item.unwrap_or_else(|| json!({}));
        if let (Some(target), Some(input)) = (item.as_object_mut(), context.input()) {
            for (key, value) in input {
                if key != "clientMutationId" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(Some(item))
    }
}

#[async_trait]
impl ValidateStage for Fixture {
    async fn validate(
        &self,
        _item: &Value,
        _resource_class: &str,
        operation: &str,
        _context: &StageContext,
    ) -> StageResult<()> {
        self.record(format!("validate:{operation}"));
        match &self.violation {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WriteStage for Fixture {
    async fn write(
        &self,
        item: Option<Value>,
        _resource_class: &str,
        operation: &str,
        _context: &StageContext,
    ) -> StageResult<Option<Value>> {
        self.record(format!("write:{operation}"));
        Ok(self.write_result.clone().or(item))
    }
}

#[async_trait]
impl SerializeStage for Fixture {
    async fn serialize(
        &self,
        item: Option<&Value>,
        _resource_class: &str,
        operation: &str,
        _context: &StageContext,
    ) -> StageResult<Option<Value>> {
        self.record(format!("serialize:{operation}"));
        Ok(item.cloned())
    }
}

/// Metadata with `app::Book` (query, create, update, delete) and
/// `app::Person` (query).
pub fn library_metadata() -> InMemoryMetadataProvider {
    InMemoryMetadataProvider::new()
        .with_resource(
            ResourceMetadata::new("app::Book", "Book")
                .with_operation("query", OperationConfig::new())
                .with_operation("create", OperationConfig::new())
                .with_operation("update", OperationConfig::new())
                .with_operation("delete", OperationConfig::new()),
            vec![],
        )
        .with_resource(
            ResourceMetadata::new("app::Person", "Person")
                .with_operation("query", OperationConfig::new()),
            vec![],
        )
}

pub fn pipeline_for(
    fixture: &Arc<Fixture>,
    metadata: InMemoryMetadataProvider,
) -> ResolverPipeline {
    ResolverPipeline::new(fixture.stages(), Arc::new(metadata))
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
