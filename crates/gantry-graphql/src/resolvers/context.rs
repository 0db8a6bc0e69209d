//! Context handed to every pipeline stage.

use async_graphql::dynamic::ResolverContext;
use serde_json::{Map, Value};

use super::value::graphql_value_to_json;

/// Items exposed to the security stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraVariables {
    /// The item (or collection) about to be returned.
    pub object: Option<Value>,
    /// The item as it was right after the read stage.
    pub previous_object: Option<Value>,
}

/// Per-field resolution context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageContext {
    /// Parent object of the field, when the parent is an object.
    pub source: Option<Map<String, Value>>,
    /// Field arguments.
    pub args: Map<String, Value>,
    /// Name of the field being resolved.
    pub field_name: String,
    pub is_collection: bool,
    pub is_mutation: bool,
    pub extra_variables: ExtraVariables,
}

impl StageContext {
    #[must_use]
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            ..Self::default()
        }
    }

    /// Captures the parent object, arguments and field name of a resolving
    /// field.
    #[must_use]
    pub fn from_resolver(ctx: &ResolverContext<'_>) -> Self {
        let source = match ctx.parent_value.as_value() {
            Some(parent @ async_graphql::Value::Object(_)) => match graphql_value_to_json(parent) {
                Value::Object(map) => Some(map),
                _ => None,
            },
            _ => None,
        };

        let args = ctx
            .args
            .as_index_map()
            .iter()
            .map(|(name, value)| (name.to_string(), graphql_value_to_json(value)))
            .collect();

        Self {
            source,
            args,
            field_name: ctx.field().name().to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Map<String, Value>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    #[must_use]
    pub fn mutation(mut self) -> Self {
        self.is_mutation = true;
        self
    }

    /// Returns an argument value, treating explicit nulls as absent.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name).filter(|value| !value.is_null())
    }

    /// Returns the `input` argument of a mutation.
    #[must_use]
    pub fn input(&self) -> Option<&Map<String, Value>> {
        self.arg("input").and_then(Value::as_object)
    }

    /// Returns the `clientMutationId` of a mutation input.
    #[must_use]
    pub fn client_mutation_id(&self) -> Option<&Value> {
        self.input()
            .and_then(|input| input.get("clientMutationId"))
            .filter(|value| !value.is_null())
    }

    /// Sets the items exposed to the security stage.
    pub fn set_extra_variables(&mut self, object: Option<Value>, previous_object: Option<Value>) {
        self.extra_variables = ExtraVariables {
            object,
            previous_object,
        };
    }
}
