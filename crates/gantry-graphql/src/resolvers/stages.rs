//! Pipeline stage contracts.
//!
//! Resolvers never touch storage, serialization or authorization
//! themselves. Each concern is a stage supplied by the application; items
//! travel between stages as JSON values.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::context::StageContext;
use super::error::StageError;

/// Result type for stage calls.
pub type StageResult<T> = Result<T, StageError>;

/// Fetches the item (or collection) a field resolves to.
#[async_trait]
pub trait ReadStage: Send + Sync {
    /// Reads the item or collection.
    ///
    /// For item fields the result must be an object or `None`. For
    /// collection fields (`context.is_collection`) it must be a list, or an
    /// object `{ "items": [...], "totalItems": n }`.
    async fn read(
        &self,
        resource_class: Option<&str>,
        root_class: Option<&str>,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<Option<Value>>;
}

/// Authorizes an operation.
#[async_trait]
pub trait DenyAccessStage: Send + Sync {
    /// Returns an error to deny the operation.
    async fn deny_access(
        &self,
        resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<()>;
}

/// Applies mutation input to the item.
#[async_trait]
pub trait DeserializeStage: Send + Sync {
    async fn deserialize(
        &self,
        item: Option<Value>,
        resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<Option<Value>>;
}

/// Validates an item before it is written.
#[async_trait]
pub trait ValidateStage: Send + Sync {
    async fn validate(
        &self,
        item: &Value,
        resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<()>;
}

/// Persists (or deletes) an item.
#[async_trait]
pub trait WriteStage: Send + Sync {
    /// Returns the persisted item, or `None` to keep the one passed in.
    async fn write(
        &self,
        item: Option<Value>,
        resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<Option<Value>>;
}

/// Turns an item into the envelope returned to GraphQL.
///
/// Envelope keys are GraphQL field names. An envelope may record its
/// resource class under `#itemResourceClass`.
#[async_trait]
pub trait SerializeStage: Send + Sync {
    async fn serialize(
        &self,
        item: Option<&Value>,
        resource_class: &str,
        operation: &str,
        context: &StageContext,
    ) -> StageResult<Option<Value>>;
}

/// The stages a resolver pipeline runs.
#[derive(Clone)]
pub struct ResolverStages {
    pub read: Arc<dyn ReadStage>,
    pub deny_access: Arc<dyn DenyAccessStage>,
    pub deserialize: Arc<dyn DeserializeStage>,
    pub validate: Arc<dyn ValidateStage>,
    pub write: Arc<dyn WriteStage>,
    pub serialize: Arc<dyn SerializeStage>,
}

impl std::fmt::Debug for ResolverStages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverStages").finish_non_exhaustive()
    }
}

/// Application-defined item transformation.
///
/// Custom resolvers are referenced by identifier from operation
/// configuration (`item_query`, `collection_query`, `mutation`). They
/// receive the current item and return the replacement.
#[async_trait]
pub trait ItemResolver: Send + Sync {
    async fn resolve(
        &self,
        item: Option<Value>,
        context: &StageContext,
    ) -> StageResult<Option<Value>>;
}

/// Lookup of custom resolvers by identifier.
pub trait ResolverLocator: Send + Sync {
    /// Returns a custom query resolver (item or collection).
    fn query_resolver(&self, id: &str) -> Option<Arc<dyn ItemResolver>>;

    /// Returns a custom mutation resolver.
    fn mutation_resolver(&self, id: &str) -> Option<Arc<dyn ItemResolver>>;
}

/// Shared resolver locator handle.
pub type DynResolverLocator = Arc<dyn ResolverLocator>;

/// Resolver locator backed by hash maps.
#[derive(Default, Clone)]
pub struct InMemoryResolverLocator {
    query: HashMap<String, Arc<dyn ItemResolver>>,
    mutation: HashMap<String, Arc<dyn ItemResolver>>,
}

impl InMemoryResolverLocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_query_resolver(
        mut self,
        id: impl Into<String>,
        resolver: Arc<dyn ItemResolver>,
    ) -> Self {
        self.query.insert(id.into(), resolver);
        self
    }

    #[must_use]
    pub fn with_mutation_resolver(
        mut self,
        id: impl Into<String>,
        resolver: Arc<dyn ItemResolver>,
    ) -> Self {
        self.mutation.insert(id.into(), resolver);
        self
    }
}

impl std::fmt::Debug for InMemoryResolverLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResolverLocator")
            .field("query", &self.query.keys().collect::<Vec<_>>())
            .field("mutation", &self.mutation.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ResolverLocator for InMemoryResolverLocator {
    fn query_resolver(&self, id: &str) -> Option<Arc<dyn ItemResolver>> {
        self.query.get(id).cloned()
    }

    fn mutation_resolver(&self, id: &str) -> Option<Arc<dyn ItemResolver>> {
        self.mutation.get(id).cloned()
    }
}
