//! GraphQL naming rules for synthesized types and fields.

use inflector::Inflector;

/// Name of a resource object, input or payload type.
///
/// - query context: `Book`
/// - mutation input: `createBookInput`
/// - mutation payload: `createBookPayload`, or `createBookNestedPayload`
///   for payloads reached through another payload
#[must_use]
pub fn resource_type_name(
    short_name: &str,
    input: bool,
    mutation: Option<&str>,
    nested: bool,
) -> String {
    let mut name = match mutation {
        Some(operation) => format!("{operation}{short_name}"),
        None => short_name.to_string(),
    };

    if input {
        name.push_str("Input");
    } else if mutation.is_some() {
        if nested {
            name.push_str("Nested");
        }
        name.push_str("Payload");
    }

    name
}

/// Name of the root query field returning a single item (`Book` -> `book`).
#[must_use]
pub fn item_field_name(short_name: &str) -> String {
    lower_first(short_name)
}

/// Name of the root query field returning a collection (`Book` -> `books`).
#[must_use]
pub fn collection_field_name(short_name: &str) -> String {
    lower_first(short_name).to_plural()
}

/// Name of a root mutation field (`create`, `Book` -> `createBook`).
#[must_use]
pub fn mutation_field_name(operation: &str, short_name: &str) -> String {
    format!("{operation}{short_name}")
}

/// Description of a root mutation field (`Creates a Book.`).
#[must_use]
pub fn mutation_description(operation: &str, short_name: &str) -> String {
    format!("{}s a {short_name}.", capitalize_first(operation))
}

/// Name of the GraphQL field exposing a resource property.
///
/// `id` is reserved for the global identifier, so a property literally named
/// `id` is exposed as `_id`.
#[must_use]
pub fn property_field_name(property: &str) -> String {
    if property == "id" {
        "_id".to_string()
    } else {
        property.to_string()
    }
}

/// Makes a filter key segment usable as a GraphQL name: dots become `__`,
/// any other character outside `[_a-zA-Z0-9]` becomes `_`.
#[must_use]
pub fn sanitize_name(segment: &str) -> String {
    let mut name = String::with_capacity(segment.len());
    for ch in segment.chars() {
        match ch {
            '.' => name.push_str("__"),
            c if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
            _ => name.push('_'),
        }
    }
    name
}

/// Checks if a name matches `[_a-zA-Z][_a-zA-Z0-9]*`.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Capitalizes the first character of a string.
#[must_use]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lowercases the first character of a string.
#[must_use]
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_name() {
        assert_eq!(resource_type_name("Book", false, None, false), "Book");
        assert_eq!(
            resource_type_name("Book", true, Some("create"), false),
            "createBookInput"
        );
        assert_eq!(
            resource_type_name("Book", false, Some("update"), false),
            "updateBookPayload"
        );
        assert_eq!(
            resource_type_name("Person", false, Some("create"), true),
            "createPersonNestedPayload"
        );
        assert_eq!(
            resource_type_name("Person", true, Some("create"), true),
            "createPersonInput"
        );
    }

    #[test]
    fn test_root_field_names() {
        assert_eq!(item_field_name("Book"), "book");
        assert_eq!(collection_field_name("Book"), "books");
        assert_eq!(mutation_field_name("delete", "Book"), "deleteBook");
        assert_eq!(mutation_description("create", "Book"), "Creates a Book.");
    }

    #[test]
    fn test_property_field_name() {
        assert_eq!(property_field_name("id"), "_id");
        assert_eq!(property_field_name("title"), "title");
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("author.name"), "author__name");
        assert_eq!(sanitize_name("created-at"), "created_at");
        assert_eq!(sanitize_name("title"), "title");
    }

    #[test]
    fn test_is_valid_graphql_name() {
        assert!(is_valid_graphql_name("Book"));
        assert!(is_valid_graphql_name("_id"));
        assert!(is_valid_graphql_name("BookFilter_order"));
        assert!(!is_valid_graphql_name(""));
        assert!(!is_valid_graphql_name("1Book"));
        assert!(!is_valid_graphql_name("order[name]"));
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(capitalize_first("create"), "Create");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(lower_first("Book"), "book");
        assert_eq!(lower_first("a"), "a");
    }
}
