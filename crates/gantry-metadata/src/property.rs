//! Property metadata and semantic property types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;

/// Builtin kind of a property type.
///
/// Only `Bool`, `Int`, `Float`, `String`, `Array`, `Iterable` and `Object`
/// can be exposed through GraphQL; the remaining kinds exist so that metadata
/// can describe them and the schema builder can reject them loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinType {
    Bool,
    Int,
    Float,
    String,
    Array,
    Iterable,
    Object,
    Null,
    Callable,
    Resource,
}

impl BuiltinType {
    /// Returns the canonical lowercase name of the builtin kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Iterable => "iterable",
            Self::Object => "object",
            Self::Null => "null",
            Self::Callable => "callable",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" | "double" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "iterable" => Ok(Self::Iterable),
            "object" => Ok(Self::Object),
            "null" => Ok(Self::Null),
            "callable" => Ok(Self::Callable),
            "resource" => Ok(Self::Resource),
            other => Err(MetadataError::invalid_type(other)),
        }
    }
}

/// Semantic type of a property.
///
/// A collection of resources is an `Object` type with `collection = true`
/// whose `collection_value_type` is itself an `Object` type naming the
/// element class. Plain `Array`/`Iterable` types are opaque lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyType {
    pub builtin: BuiltinType,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub class_name: Option<String>,

    #[serde(default)]
    pub collection: bool,

    #[serde(default)]
    pub collection_value_type: Option<Box<PropertyType>>,
}

impl PropertyType {
    /// Creates a non-collection type of the given builtin kind.
    #[must_use]
    pub fn new(builtin: BuiltinType, nullable: bool) -> Self {
        Self {
            builtin,
            nullable,
            class_name: None,
            collection: false,
            collection_value_type: None,
        }
    }

    /// Creates a reference to an object of `class_name`.
    #[must_use]
    pub fn object(class_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::new(BuiltinType::Object, nullable)
        }
    }

    /// Creates a collection whose elements are objects of `class_name`.
    #[must_use]
    pub fn collection_of(class_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            collection: true,
            collection_value_type: Some(Box::new(Self::object(class_name, false))),
            ..Self::new(BuiltinType::Object, nullable)
        }
    }

    /// Interprets a filter description type name.
    ///
    /// Builtin names (`string`, `int`, ...) map to their builtin kind; anything
    /// else is treated as an object class name.
    #[must_use]
    pub fn from_type_name(type_name: &str, nullable: bool) -> Self {
        match type_name.parse::<BuiltinType>() {
            Ok(builtin) => Self::new(builtin, nullable),
            Err(_) => Self::object(type_name, nullable),
        }
    }

    /// Returns `true` if this is a collection of objects.
    #[must_use]
    pub fn is_object_collection(&self) -> bool {
        self.collection
            && self
                .collection_value_type
                .as_ref()
                .is_some_and(|value| value.builtin == BuiltinType::Object)
    }

    /// Returns the class this type points at: the element class for object
    /// collections, the own class otherwise.
    #[must_use]
    pub fn target_class(&self) -> Option<&str> {
        if self.is_object_collection() {
            self.collection_value_type
                .as_ref()
                .and_then(|value| value.class_name.as_deref())
        } else {
            self.class_name.as_deref()
        }
    }
}

/// Metadata for a single resource property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    pub name: String,

    #[serde(default, rename = "type")]
    pub property_type: Option<PropertyType>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub readable: bool,

    #[serde(default = "default_true")]
    pub writable: bool,

    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

fn default_true() -> bool {
    true
}

impl PropertyMetadata {
    /// Creates readable and writable property metadata of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type: Some(property_type),
            description: None,
            readable: true,
            writable: true,
            deprecation_reason: None,
        }
    }

    /// Creates property metadata without a known type.
    #[must_use]
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            property_type: None,
            ..Self::new(name, PropertyType::new(BuiltinType::Null, true))
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    #[must_use]
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    #[must_use]
    pub fn with_deprecation_reason(mut self, reason: impl Into<String>) -> Self {
        self.deprecation_reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_from_str() {
        assert_eq!("string".parse::<BuiltinType>().unwrap(), BuiltinType::String);
        assert_eq!("boolean".parse::<BuiltinType>().unwrap(), BuiltinType::Bool);
        assert_eq!("integer".parse::<BuiltinType>().unwrap(), BuiltinType::Int);
        assert!("app::Book".parse::<BuiltinType>().is_err());
    }

    #[test]
    fn test_from_type_name() {
        let ty = PropertyType::from_type_name("int", false);
        assert_eq!(ty.builtin, BuiltinType::Int);
        assert!(ty.class_name.is_none());

        let ty = PropertyType::from_type_name("DateTime", true);
        assert_eq!(ty.builtin, BuiltinType::Object);
        assert_eq!(ty.class_name.as_deref(), Some("DateTime"));
        assert!(ty.nullable);
    }

    #[test]
    fn test_collection_target_class() {
        let ty = PropertyType::collection_of("app::Book", false);
        assert!(ty.is_object_collection());
        assert_eq!(ty.target_class(), Some("app::Book"));

        let ty = PropertyType::object("app::Person", true);
        assert!(!ty.is_object_collection());
        assert_eq!(ty.target_class(), Some("app::Person"));

        let ty = PropertyType::new(BuiltinType::Array, false);
        assert!(!ty.is_object_collection());
        assert_eq!(ty.target_class(), None);
    }

    #[test]
    fn test_property_defaults_from_json() {
        let property: PropertyMetadata = serde_json::from_value(serde_json::json!({
            "name": "title",
            "type": { "builtin": "string" }
        }))
        .unwrap();

        assert!(property.readable);
        assert!(property.writable);
        assert_eq!(
            property.property_type,
            Some(PropertyType::new(BuiltinType::String, false))
        );
    }
}
