//! Resolver pipeline for synthesized fields.
//!
//! Every resource field resolves through the same staged pipeline:
//! - `item`: single items (`book(id:)`, `node(id:)`, nested references)
//! - `mutation`: item mutations (`createBook(input:)`...)
//! - `collection`: resource collections and Relay connections
//!
//! The stages themselves (read, deny access, deserialize, validate, write,
//! serialize) are supplied by the application through [`ResolverStages`].

mod collection;
mod context;
mod error;
mod factory;
mod item;
mod mutation;
mod pipeline;
mod stages;
mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{Page, decode_cursor, encode_cursor};
pub use context::{ExtraVariables, StageContext};
pub use error::{INTERNAL_ERROR_MESSAGE, MismatchSource, PipelineError, StageError};
pub use factory::{
    CollectionResolverFactory, ItemMutationResolverFactory, ItemResolverFactory, property_resolver,
};
pub use mutation::CLIENT_MUTATION_ID;
pub use pipeline::{PaginationOptions, ResolverPipeline};
pub use stages::{
    DenyAccessStage, DeserializeStage, DynResolverLocator, InMemoryResolverLocator, ItemResolver,
    ReadStage, ResolverLocator, ResolverStages, SerializeStage, StageResult, ValidateStage,
    WriteStage,
};
pub use value::{graphql_value_to_json, json_to_graphql_value};
