//! GraphQL schema synthesis and lazy loading.
//!
//! The schema is synthesized from resource metadata: every GraphQL-exposed
//! resource contributes query fields, mutation fields and the object, input,
//! payload, connection and filter types they reference.
//!
//! ## Components
//!
//! - [`ResourceSchemaBuilder`] - Walks metadata and builds the schema
//! - [`LazySchema`] - Thread-safe lazy schema holder with rebuild support
//! - [`cache`] - Type arena of one build
//! - [`converter`] - Property type to GraphQL type conversion
//! - [`filters`] - Filter argument shapes
//! - [`naming`] - Type and field naming rules
//! - [`node`] - The `Node` interface and concrete type resolution
//!
//! ## Architecture
//!
//! A build runs in two phases over an explicit [`cache::BuildContext`]:
//! 1. Root fields are converted; every resource type they reference is
//!    declared under its final name and queued
//! 2. Queued types are drained and their fields computed, which may declare
//!    and queue further types
//!
//! Declaring before populating makes cyclic resource graphs terminate: a
//! type referring to itself finds its own declaration in the cache.

mod builder;
pub mod cache;
pub mod converter;
pub mod filters;
mod lazy;
pub mod naming;
pub mod node;

pub use builder::{ResourceSchemaBuilder, SchemaBuilderConfig, SchemaTypes};
pub use lazy::{LazySchema, SchemaState};
