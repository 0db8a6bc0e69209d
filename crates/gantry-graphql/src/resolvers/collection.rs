//! Collection resolution: `books(first:, after:)` and nested resource
//! collections.
//!
//! With pagination enabled the result is a Relay connection:
//!
//! ```json
//! {
//!   "edges": [{ "node": {...}, "cursor": "MA==" }],
//!   "pageInfo": { "endCursor": "MA==", "hasNextPage": false }
//! }
//! ```
//!
//! Cursors are base64-encoded item offsets.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gantry_metadata::QUERY_OPERATION;
use serde_json::{Value, json};
use tracing::debug;

use super::context::StageContext;
use super::error::PipelineError;
use super::pipeline::{ResolverPipeline, json_kind};

/// Encodes an item offset as an opaque cursor.
#[must_use]
pub fn encode_cursor(offset: usize) -> String {
    STANDARD.encode(offset.to_string())
}

/// Decodes a cursor produced by [`encode_cursor`].
#[must_use]
pub fn decode_cursor(cursor: &str) -> Option<usize> {
    let bytes = STANDARD.decode(cursor).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse().ok()
}

/// One page of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// Offset of the first item.
    pub offset: usize,
    /// Total number of items, when known.
    pub total_items: Option<usize>,
}

impl Page {
    /// Interprets a read stage result.
    ///
    /// Accepts a list or an object `{ "items": [...], "totalItems": n }`;
    /// nothing is an empty page.
    fn from_read_result(
        result: Option<Value>,
        offset: usize,
        field_name: &str,
    ) -> Result<Self, PipelineError> {
        let invalid = |found| PipelineError::InvalidCollectionResult {
            field: field_name.to_string(),
            found,
        };

        match result {
            None | Some(Value::Null) => Ok(Self {
                items: Vec::new(),
                offset,
                total_items: None,
            }),
            Some(Value::Array(items)) => Ok(Self {
                items,
                offset,
                total_items: None,
            }),
            Some(Value::Object(mut page)) => match page.remove("items") {
                Some(Value::Array(items)) => Ok(Self {
                    items,
                    offset,
                    total_items: page
                        .get("totalItems")
                        .and_then(Value::as_u64)
                        .and_then(|total| usize::try_from(total).ok()),
                }),
                Some(other) => Err(invalid(json_kind(&other))),
                None => Err(invalid("object")),
            },
            Some(other) => Err(invalid(json_kind(&other))),
        }
    }

    fn has_next_page(&self) -> bool {
        self.total_items
            .is_some_and(|total| self.offset.saturating_add(self.items.len()) < total)
    }

    /// Wraps the page in a connection envelope.
    #[must_use]
    pub fn into_connection(self) -> Value {
        let has_next_page = self.has_next_page();
        let offset = self.offset;
        let end_cursor = self
            .items
            .len()
            .checked_sub(1)
            .map(|last| encode_cursor(offset.saturating_add(last)));

        let edges: Vec<Value> = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                let cursor = encode_cursor(offset.saturating_add(index));
                json!({ "node": node, "cursor": cursor })
            })
            .collect();

        json!({
            "edges": edges,
            "pageInfo": {
                "endCursor": end_cursor,
                "hasNextPage": has_next_page,
            },
        })
    }
}

impl ResolverPipeline {
    /// Resolves a resource collection.
    ///
    /// Runs read, the configured custom collection query resolver, the
    /// security stage with the whole collection as `object`, then
    /// serializes every item.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `after` cursor, when the read stage returns
    /// something other than a list or a page, or when a stage fails.
    pub async fn resolve_collection(
        &self,
        resource_class: &str,
        root_class: Option<&str>,
        operation: Option<&str>,
        mut context: StageContext,
    ) -> Result<Value, PipelineError> {
        let operation = operation.unwrap_or(QUERY_OPERATION);
        context.is_collection = true;
        let offset = self.page_offset(&context)?;

        debug!(
            field = %context.field_name,
            resource_class,
            operation,
            offset,
            "Resolving collection"
        );

        let mut collection = self
            .stages
            .read
            .read(Some(resource_class), root_class, operation, &context)
            .await?;

        let resource = self.resource(resource_class)?;
        if let Some(resolver_id) = resource
            .operation(operation)
            .and_then(|config| config.collection_query.as_deref())
        {
            let resolver = self.query_resolver(resolver_id)?;
            collection = resolver.resolve(collection, &context).await?;
        }

        let mut page = Page::from_read_result(collection, offset, &context.field_name)?;

        context.set_extra_variables(Some(Value::Array(page.items.clone())), None);
        self.stages
            .deny_access
            .deny_access(resource_class, operation, &context)
            .await?;

        let mut serialized = Vec::with_capacity(page.items.len());
        for item in &page.items {
            if let Some(value) = self
                .stages
                .serialize
                .serialize(Some(item), resource_class, operation, &context)
                .await?
            {
                serialized.push(value);
            }
        }
        page.items = serialized;

        Ok(self.finish(page))
    }

    /// Paginates a collection already present on the parent object.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `after` cursor.
    pub fn paginate_prefetched(
        &self,
        items: Vec<Value>,
        context: &StageContext,
    ) -> Result<Value, PipelineError> {
        if !self.pagination.enabled {
            return Ok(Value::Array(items));
        }

        let offset = self.page_offset(context)?;
        let total_items = items.len();
        let page = Page {
            items: items
                .into_iter()
                .skip(offset)
                .take(self.page_size(context))
                .collect(),
            offset,
            total_items: Some(total_items),
        };

        Ok(page.into_connection())
    }

    fn finish(&self, page: Page) -> Value {
        if self.pagination.enabled {
            page.into_connection()
        } else {
            Value::Array(page.items)
        }
    }

    /// Offset of the first requested item: one past the `after` cursor.
    fn page_offset(&self, context: &StageContext) -> Result<usize, PipelineError> {
        if !self.pagination.enabled {
            return Ok(0);
        }

        match context.arg("after") {
            None => Ok(0),
            Some(Value::String(cursor)) => decode_cursor(cursor)
                .and_then(|offset| offset.checked_add(1))
                .ok_or_else(|| PipelineError::InvalidCursor(cursor.clone())),
            Some(other) => Err(PipelineError::InvalidCursor(other.to_string())),
        }
    }

    fn page_size(&self, context: &StageContext) -> usize {
        context
            .arg("first")
            .and_then(Value::as_u64)
            .and_then(|first| usize::try_from(first).ok())
            .unwrap_or(self.pagination.default_page_size)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::resolvers::error::StageError;
    use crate::resolvers::pipeline::PaginationOptions;
    use crate::resolvers::testing::{Fixture, library_metadata, object, pipeline_for};

    #[test]
    fn test_cursor_encoding() {
        assert_eq!(encode_cursor(0), "MA==");
        assert_eq!(decode_cursor("MA=="), Some(0));
        assert_eq!(decode_cursor(&encode_cursor(41)), Some(41));
        assert_eq!(decode_cursor("not a cursor"), None);
    }

    #[test]
    fn test_empty_page_connection() {
        let page = Page {
            items: vec![],
            offset: 0,
            total_items: None,
        };
        assert_eq!(
            page.into_connection(),
            json!({"edges": [], "pageInfo": {"endCursor": null, "hasNextPage": false}})
        );
    }

    #[tokio::test]
    async fn test_collection_connection() {
        let fixture = Arc::new(Fixture::reading(json!({
            "items": [{"id": "/books/2"}, {"id": "/books/3"}],
            "totalItems": 5,
        })));
        let pipeline = pipeline_for(&fixture, library_metadata());

        let context =
            StageContext::new("books").with_args(object(json!({"after": encode_cursor(0)})));
        let result = pipeline
            .resolve_collection("app::Book", Some("app::Book"), None, context)
            .await
            .unwrap();

        assert_eq!(
            result,
            json!({
                "edges": [
                    {"node": {"id": "/books/2"}, "cursor": encode_cursor(1)},
                    {"node": {"id": "/books/3"}, "cursor": encode_cursor(2)},
                ],
                "pageInfo": {"endCursor": encode_cursor(2), "hasNextPage": true},
            })
        );
        assert_eq!(
            fixture.calls(),
            vec!["read:query", "deny_access:query", "serialize:query", "serialize:query"]
        );

        let variables = fixture.security_variables.lock().unwrap();
        assert_eq!(
            variables[0].object,
            Some(json!([{"id": "/books/2"}, {"id": "/books/3"}]))
        );
    }

    #[tokio::test]
    async fn test_collection_without_pagination_is_a_list() {
        let fixture = Arc::new(Fixture::reading(json!([{"id": "/books/1"}])));
        let pipeline =
            pipeline_for(&fixture, library_metadata()).with_pagination(PaginationOptions {
                enabled: false,
                default_page_size: 30,
            });

        let result = pipeline
            .resolve_collection("app::Book", None, None, StageContext::new("books"))
            .await
            .unwrap();
        assert_eq!(result, json!([{"id": "/books/1"}]));
    }

    #[tokio::test]
    async fn test_invalid_collection_and_cursor() {
        let fixture = Arc::new(Fixture::reading(json!("books")));
        let pipeline = pipeline_for(&fixture, library_metadata());

        let err = pipeline
            .resolve_collection("app::Book", None, None, StageContext::new("books"))
            .await
            .unwrap_err();
        assert!(err.is_internal());

        let context = StageContext::new("books").with_args(object(json!({"after": "!!"})));
        let err = pipeline
            .resolve_collection("app::Book", None, None, context)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cursor !! is invalid");
        assert!(!err.is_internal());
    }

    #[tokio::test]
    async fn test_collection_access_denied() {
        let fixture = Arc::new(Fixture {
            read_result: Some(json!([])),
            denial: Some(StageError::access_denied("Access Denied.")),
            ..Fixture::default()
        });
        let pipeline = pipeline_for(&fixture, library_metadata());

        let err = pipeline
            .resolve_collection("app::Book", None, None, StageContext::new("books"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ACCESS_DENIED");
    }

    #[test]
    fn test_paginate_prefetched() {
        let fixture = Arc::new(Fixture::default());
        let pipeline = pipeline_for(&fixture, library_metadata());
        let items = vec![json!({"id": "a"}), json!({"id": "b"}), json!({"id": "c"})];

        let context = StageContext::new("books")
            .with_args(object(json!({"first": 1, "after": encode_cursor(0)})));
        let result = pipeline.paginate_prefetched(items, &context).unwrap();

        assert_eq!(
            result,
            json!({
                "edges": [{"node": {"id": "b"}, "cursor": encode_cursor(1)}],
                "pageInfo": {"endCursor": encode_cursor(1), "hasNextPage": true},
            })
        );
        assert!(fixture.calls().is_empty());
    }

    #[test]
    fn test_cursor_at_max_offset_is_invalid() {
        let fixture = Arc::new(Fixture::default());
        let pipeline = pipeline_for(&fixture, library_metadata());
        let cursor = encode_cursor(usize::MAX);

        let context = StageContext::new("books")
            .with_args(object(json!({"first": 1, "after": cursor.clone()})));
        let err = pipeline
            .paginate_prefetched(vec![json!({"id": "a"})], &context)
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_CURSOR");
        assert_eq!(err.to_string(), format!("Cursor {cursor} is invalid"));
    }

    #[tokio::test]
    async fn test_collection_rejects_max_offset_cursor() {
        let fixture = Arc::new(Fixture::reading(json!([{"id": "/books/1"}])));
        let pipeline = pipeline_for(&fixture, library_metadata());

        let context = StageContext::new("books")
            .with_args(object(json!({"after": encode_cursor(usize::MAX)})));
        let err = pipeline
            .resolve_collection("app::Book", None, None, context)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_CURSOR");
        assert!(fixture.calls().is_empty());
    }

    #[test]
    fn test_connection_near_max_offset() {
        let page = Page {
            items: vec![json!({"id": "a"}), json!({"id": "b"})],
            offset: usize::MAX - 1,
            total_items: Some(usize::MAX),
        };

        let connection = page.into_connection();
        assert_eq!(connection["pageInfo"]["endCursor"], json!(encode_cursor(usize::MAX)));
        assert_eq!(connection["pageInfo"]["hasNextPage"], json!(false));
    }

    #[test]
    fn test_cursor_past_end_of_prefetched_list() {
        let fixture = Arc::new(Fixture::default());
        let pipeline = pipeline_for(&fixture, library_metadata());
        let items = vec![json!({"id": "a"}), json!({"id": "b"})];

        let context = StageContext::new("books")
            .with_args(object(json!({"after": encode_cursor(5)})));
        let result = pipeline.paginate_prefetched(items, &context).unwrap();

        assert_eq!(
            result,
            json!({"edges": [], "pageInfo": {"endCursor": null, "hasNextPage": false}})
        );
    }
}
