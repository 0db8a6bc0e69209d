//! Filter argument synthesis.
//!
//! Filters describe their parameters with flattened query-string keys such
//! as `order[name]` or `tags[]`. Those keys are parsed into paths, merged
//! into a tree, and the tree is turned into GraphQL arguments: leaves keep
//! their scalar type, branches become input types named
//! `{ShortName}Filter_{path}`.
//!
//! ```text
//! order[name]  -> order: BookFilter_order { name: String }
//! order[title] ->                         { name: String, title: String }
//! tags[]       -> tags_list: [String]
//! ```

use async_graphql::dynamic::TypeRef;
use indexmap::IndexMap;
use tracing::trace;

use super::cache::{ArgumentDef, BuildContext, FieldDef, SchemaType, TypeKey, TypeKind};
use super::naming::sanitize_name;
use crate::error::GraphQLError;

/// One node of a filter argument tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    /// A scalar argument.
    Leaf(TypeRef),
    /// A nested input type.
    Branch {
        /// Type name of the nested input.
        name: String,
        children: FilterArgs,
    },
}

/// Argument name to argument tree, in declaration order.
pub type FilterArgs = IndexMap<String, FilterArg>;

/// Splits a flattened filter key into its path segments.
///
/// `a[b][c]` yields `["a", "b", "c"]`. A key that does not follow the
/// bracket syntax is kept whole as a single segment.
#[must_use]
pub fn parse_filter_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };

    let head = &key[..open];
    if head.is_empty() {
        return vec![key.to_string()];
    }

    let mut segments = vec![head.to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![key.to_string()];
        };
        let Some(close) = inner.find(']') else {
            return vec![key.to_string()];
        };
        let segment = &inner[..close];
        if segment.is_empty() || segment.contains('[') {
            return vec![key.to_string()];
        }
        segments.push(segment.to_string());
        rest = &inner[close + 1..];
    }

    segments
}

/// Merges one filter parameter into the argument tree.
///
/// A key ending in `[]` declares a list: its last segment gets a `_list`
/// suffix and the leaf type is wrapped in a list. The first value written
/// at a path wins; branches merge recursively.
pub fn merge_filter_key(args: &mut FilterArgs, short_name: &str, key: &str, leaf: TypeRef) {
    let (mut path, leaf) = match key.strip_suffix("[]") {
        Some(stripped) => (
            parse_filter_key(stripped),
            TypeRef::List(Box::new(leaf)),
        ),
        None => (parse_filter_key(key), leaf),
    };

    if let Some(last) = path.last_mut()
        && key.ends_with("[]")
    {
        last.push_str("_list");
    }

    let path: Vec<String> = path.iter().map(|segment| sanitize_name(segment)).collect();
    insert_path(args, short_name, &[], &path, leaf);
}

fn insert_path(
    children: &mut FilterArgs,
    short_name: &str,
    prefix: &[String],
    remaining: &[String],
    leaf: TypeRef,
) {
    let Some((head, rest)) = remaining.split_first() else {
        return;
    };

    if rest.is_empty() {
        children.entry(head.clone()).or_insert(FilterArg::Leaf(leaf));
        return;
    }

    let mut path = prefix.to_vec();
    path.push(head.clone());

    let entry = children
        .entry(head.clone())
        .or_insert_with(|| FilterArg::Branch {
            name: branch_type_name(short_name, &path),
            children: FilterArgs::new(),
        });

    match entry {
        FilterArg::Branch { children, .. } => insert_path(children, short_name, &path, rest, leaf),
        FilterArg::Leaf(_) => {
            trace!(path = %path.join("."), "Filter path already holds a scalar, keeping it");
        }
    }
}

/// Name of the input type backing a filter branch.
#[must_use]
pub fn branch_type_name(short_name: &str, path: &[String]) -> String {
    format!("{short_name}Filter_{}", path.join("_"))
}

/// Turns an argument tree into field arguments, declaring one input type
/// per branch.
///
/// Branch types are cached by name, so the same nested shape requested by
/// several fields is declared once.
///
/// # Errors
///
/// Returns `GraphQLError::SchemaBuildFailed` if a branch type name collides
/// with an unrelated type.
pub fn materialize_filter_args(
    ctx: &mut BuildContext,
    args: FilterArgs,
) -> Result<Vec<ArgumentDef>, GraphQLError> {
    args.into_iter()
        .map(|(name, arg)| Ok(ArgumentDef::new(name, materialize_arg(ctx, arg)?)))
        .collect()
}

fn materialize_arg(ctx: &mut BuildContext, arg: FilterArg) -> Result<TypeRef, GraphQLError> {
    match arg {
        FilterArg::Leaf(type_ref) => Ok(type_ref),
        FilterArg::Branch { name, children } => {
            let key = TypeKey::Filter { name: name.clone() };
            if let Some(id) = ctx.get(&key) {
                return Ok(ctx.type_ref(id));
            }

            let mut fields = Vec::with_capacity(children.len());
            for (child_name, child) in children {
                fields.push(FieldDef::new(child_name, materialize_arg(ctx, child)?));
            }

            let id = ctx.declare(key, SchemaType::new(&name, TypeKind::Filter))?;
            ctx.populate(id, fields);
            Ok(ctx.type_ref(id))
        }
    }
}
