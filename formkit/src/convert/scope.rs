use crate::{
    model::DataSchema,
    utils::{escape_pointer, unescape_pointer},
};

/// Every scope reachable from `schema` through `properties` and `items`.
///
/// Paths are rooted at `#` and listed depth-first in property insertion
/// order. The root itself is not included; see [`scope_options`].
pub fn build_scopes(schema: &DataSchema) -> Vec<String> {
    let mut scopes = Vec::new();
    collect(schema, "#", &mut scopes);
    scopes
}

fn collect(schema: &DataSchema, path: &str, out: &mut Vec<String>) {
    if let Some(properties) = &schema.properties {
        for (key, sub) in properties {
            let scope = format!("{path}/properties/{}", escape_pointer(key));
            out.push(scope.clone());
            collect(sub, &scope, out);
        }
    }
    if let Some(items) = &schema.items {
        let scope = format!("{path}/items");
        out.push(scope.clone());
        collect(items, &scope, out);
    }
}

/// Scopes a control may pick from: the root `#` followed by
/// [`build_scopes`].
pub fn scope_options(schema: &DataSchema) -> Vec<String> {
    let mut options = vec!["#".to_string()];
    options.extend(build_scopes(schema));
    options
}

/// Find the node a scope points at.
///
/// Accepts `#`, `#/`, and any chain of `properties/<key>`, `items` and
/// `definitions/<key>` segments. Keys are JSON-Pointer escaped.
pub fn resolve_scope<'a>(schema: &'a DataSchema, scope: &str) -> Option<&'a DataSchema> {
    let rest = scope.strip_prefix('#')?;
    let rest = match rest {
        "" | "/" => return Some(schema),
        rest => rest.strip_prefix('/')?,
    };

    let mut node = schema;
    let mut segments = rest.split('/');
    while let Some(segment) = segments.next() {
        node = match segment {
            "properties" => node.property(&unescape_pointer(segments.next()?))?,
            "definitions" => node.definitions.get(&unescape_pointer(segments.next()?))?,
            "items" => node.items.as_deref()?,
            _ => return None,
        };
    }
    Some(node)
}
