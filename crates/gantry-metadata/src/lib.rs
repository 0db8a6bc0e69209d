//! # gantry-metadata
//!
//! Resource and property metadata contracts for the Gantry GraphQL layer.
//!
//! The GraphQL schema builder introspects resources through the traits in
//! this crate. How metadata is authored or stored is up to the application;
//! an in-memory implementation is provided for code-defined resources and
//! for tests.
//!
//! ## Modules
//!
//! - [`resource`] - Resource descriptors and per-operation configuration
//! - [`property`] - Property descriptors and semantic property types
//! - [`provider`] - The `MetadataProvider` trait
//! - [`filter`] - Filter descriptions and the `FilterLocator` trait
//! - [`memory`] - In-memory implementations
//! - [`error`] - Lookup errors

pub mod error;
pub mod filter;
pub mod memory;
pub mod property;
pub mod provider;
pub mod resource;

pub use error::MetadataError;
pub use filter::{
    DynFilterLocator, FilterDescription, FilterLocator, FilterParameter, InMemoryFilterLocator,
};
pub use memory::{InMemoryMetadataProvider, ResourceDefinition};
pub use property::{BuiltinType, PropertyMetadata, PropertyType};
pub use provider::{DynMetadataProvider, MetadataProvider, MetadataResult};
pub use resource::{
    CREATE_OPERATION, DELETE_OPERATION, OperationConfig, QUERY_OPERATION, ResourceMetadata,
    UPDATE_OPERATION, short_class_name,
};
