//! GraphQL configuration.
//!
//! This module provides configuration options for the GraphQL layer.
//! Configuration can be specified in `gantry.toml` under the `[graphql]` section.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! pagination_enabled = true
//! default_page_size = 30
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::GraphQLError;

/// GraphQL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Wrap resource collections in Relay connections and accept
    /// `first`/`after` arguments on collection fields.
    /// Default: true
    #[serde(default = "default_pagination_enabled")]
    pub pagination_enabled: bool,

    /// Page size used by collection fields when `first` is not given.
    /// Default: 30
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Should be disabled in production for security.
    /// Default: true (development-friendly)
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_pagination_enabled() -> bool {
    true
}

fn default_page_size() -> usize {
    30
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            pagination_enabled: default_pagination_enabled(),
            default_page_size: default_page_size(),
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

/// Document shape of a `gantry.toml` file; only the `[graphql]` table is read.
#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    graphql: Option<GraphQLConfig>,
}

impl GraphQLConfig {
    /// Reads the `[graphql]` section of a TOML document and validates it.
    ///
    /// A document without a `[graphql]` section yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidConfig` if the document cannot be parsed
    /// or a value is out of range.
    pub fn from_toml(document: &str) -> Result<Self, GraphQLError> {
        let document: ConfigDocument = toml::from_str(document)
            .map_err(|e| GraphQLError::InvalidConfig(e.to_string()))?;
        let config = document.graphql.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `GraphQLError::InvalidConfig` if a value is out of range.
    pub fn validate(&self) -> Result<(), GraphQLError> {
        if self.max_depth == 0 {
            return Err(GraphQLError::InvalidConfig("graphql.max_depth must be > 0".into()));
        }
        if self.max_complexity == 0 {
            return Err(GraphQLError::InvalidConfig(
                "graphql.max_complexity must be > 0".into(),
            ));
        }
        if self.pagination_enabled && self.default_page_size == 0 {
            return Err(GraphQLError::InvalidConfig(
                "graphql.default_page_size must be > 0 when pagination is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> crate::SchemaBuilderConfig {
        crate::SchemaBuilderConfig {
            pagination_enabled: self.pagination_enabled,
            default_page_size: self.default_page_size,
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
        }
    }
}
