use schemars::JsonSchema;
use serde_json::{Map, Value};

use crate::{
    error::{ConversionError, FormError, Result},
    model::{DataSchema, Document, Format, SchemaType},
    utils::{escape_pointer, unescape_pointer},
};

const DEFINITION_ROOTS: [&str; 2] = ["#/definitions/", "#/$defs/"];

/// Keywords carried over verbatim from a foreign document.
const KEPT: [&str; 18] = [
    "title",
    "description",
    "default",
    "examples",
    "nullable",
    "additionalProperties",
    "minItems",
    "maxItems",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "enum",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// Bring a foreign JSON Schema document into the reduced vocabulary.
///
/// Local `$ref`s into `definitions` or `$defs` are inlined, `type` unions
/// with `null` and two-way `anyOf`/`oneOf` with a `null` branch collapse to
/// the non-null type plus `nullable`. Unknown formats and keywords outside
/// the vocabulary are dropped, as are keywords that do not apply to a
/// node's type.
pub fn import_schema(document: &Value) -> Result<DataSchema> {
    let Value::Object(root) = document else {
        return Err(FormError::validation("#", "schema document must be an object"));
    };
    let importer = Importer { root };
    let mut stack = Vec::new();
    let value = importer.node(document, "#", &mut stack)?;
    let mut schema = DataSchema::from_value(value)?;
    retain_keywords(&mut schema);
    debug!(
        "imported schema with {} top-level properties",
        schema.properties.as_ref().map_or(0, |p| p.len())
    );
    Ok(schema)
}

impl DataSchema {
    /// Data schema describing the Rust type `T`.
    pub fn for_type<T: JsonSchema>() -> Result<DataSchema> {
        let document = serde_json::to_value(schemars::schema_for!(T))
            .map_err(|e| FormError::validation("#", e.to_string()))?;
        import_schema(&document)
    }
}

struct Importer<'a> {
    root: &'a Map<String, Value>,
}

impl Importer<'_> {
    fn node(&self, value: &Value, path: &str, stack: &mut Vec<String>) -> Result<Value> {
        let Value::Object(node) = value else {
            return Err(FormError::validation(path, "expected a schema object"));
        };

        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            let mut resolved = self.follow(reference, path, stack)?;
            // sibling annotations override the referenced schema
            if let Value::Object(target) = &mut resolved {
                for key in ["title", "description", "default", "examples"] {
                    if let Some(v) = node.get(key) {
                        target.insert(key.to_string(), v.clone());
                    }
                }
            }
            return Ok(resolved);
        }

        if let Some(inner) = nullable_branch(node) {
            let mut resolved = self.node(inner, path, stack)?;
            if let Value::Object(target) = &mut resolved {
                target.insert("nullable".into(), Value::Bool(true));
                for key in ["title", "description", "default"] {
                    if let Some(v) = node.get(key) {
                        target.insert(key.to_string(), v.clone());
                    }
                }
            }
            return Ok(resolved);
        }

        if let Some([single]) = node.get("allOf").and_then(Value::as_array).map(Vec::as_slice) {
            return self.node(single, path, stack);
        }

        let mut out = Map::new();
        let ty = self.type_of(node, path, &mut out)?;
        out.insert("type".into(), Value::String(ty.to_string()));

        for key in KEPT {
            let Some(value) = node.get(key) else {
                continue;
            };
            match key {
                "format" => {
                    if value.as_str().and_then(Format::from_name).is_some() {
                        out.insert(key.into(), value.clone());
                    } else {
                        trace!("dropping unknown format {value} at {path}");
                    }
                }
                "enum" => {
                    if value.as_array().is_some_and(|a| a.iter().all(Value::is_string)) {
                        out.insert(key.into(), value.clone());
                    } else {
                        trace!("dropping non-string enum at {path}");
                    }
                }
                _ => {
                    out.insert(key.into(), value.clone());
                }
            }
        }

        match ty {
            SchemaType::Object => self.object_members(node, path, stack, &mut out)?,
            SchemaType::Array => {
                if let Some(items) = node.get("items") {
                    let items = self.node(items, &format!("{path}/items"), stack)?;
                    out.insert("items".into(), items);
                }
            }
            _ => {}
        }
        Ok(Value::Object(out))
    }

    fn object_members(
        &self,
        node: &Map<String, Value>,
        path: &str,
        stack: &mut Vec<String>,
        out: &mut Map<String, Value>,
    ) -> Result<()> {
        let mut properties = Map::new();
        if let Some(Value::Object(props)) = node.get("properties") {
            for (key, sub) in props {
                let sub_path = format!("{path}/properties/{}", escape_pointer(key));
                if sub.is_boolean() {
                    warn!("skipping untyped property at {sub_path}");
                    continue;
                }
                properties.insert(key.clone(), self.node(sub, &sub_path, stack)?);
            }
        }
        if let Some(Value::Array(required)) = node.get("required") {
            let required: Vec<Value> = required
                .iter()
                .filter(|k| k.as_str().is_some_and(|k| properties.contains_key(k)))
                .cloned()
                .collect();
            if !required.is_empty() {
                out.insert("required".into(), Value::Array(required));
            }
        }
        out.insert("properties".into(), Value::Object(properties));
        Ok(())
    }

    fn type_of(
        &self,
        node: &Map<String, Value>,
        path: &str,
        out: &mut Map<String, Value>,
    ) -> Result<SchemaType> {
        let tag = match node.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(Value::Array(tags)) => {
                let mut rest: Vec<&str> = tags.iter().filter_map(Value::as_str).collect();
                if rest.contains(&"null") {
                    out.insert("nullable".into(), Value::Bool(true));
                    rest.retain(|t| *t != "null");
                }
                match rest.as_slice() {
                    [] => "null".to_string(),
                    [tag] => tag.to_string(),
                    _ => {
                        return Err(FormError::validation(
                            path,
                            format!("type union {rest:?} is not supported"),
                        ));
                    }
                }
            }
            Some(other) => {
                return Err(FormError::validation(path, format!("invalid type {other}")));
            }
            None if node.contains_key("properties") => "object".to_string(),
            None if node.contains_key("items") => "array".to_string(),
            None if node.contains_key("enum") => "string".to_string(),
            None => {
                return Err(ConversionError::MissingType {
                    path: path.to_string(),
                }
                .into());
            }
        };
        Ok(SchemaType::from_tag(&tag, path)?)
    }

    fn follow(&self, reference: &str, path: &str, stack: &mut Vec<String>) -> Result<Value> {
        let unresolved = || ConversionError::UnresolvedRef {
            path: path.to_string(),
            reference: reference.to_string(),
        };

        let target = DEFINITION_ROOTS
            .iter()
            .find_map(|prefix| {
                let name = reference.strip_prefix(prefix)?;
                let section = &prefix[2..prefix.len() - 1];
                self.root.get(section)?.get(unescape_pointer(name))
            })
            .ok_or_else(unresolved)?;

        if stack.iter().any(|r| r == reference) {
            return Err(unresolved().into());
        }
        stack.push(reference.to_string());
        let resolved = self.node(target, path, stack);
        stack.pop();
        resolved
    }
}

// `anyOf`/`oneOf` of exactly one schema and `{"type": "null"}`.
fn nullable_branch(node: &Map<String, Value>) -> Option<&Value> {
    let branches = node
        .get("anyOf")
        .or_else(|| node.get("oneOf"))?
        .as_array()?;
    let is_null = |v: &Value| v.get("type").and_then(Value::as_str) == Some("null");
    match branches.as_slice() {
        [a, b] if is_null(b) => Some(a),
        [a, b] if is_null(a) => Some(b),
        _ => None,
    }
}

fn retain_keywords(schema: &mut DataSchema) {
    schema.keywords.retain_for(schema.schema_type);
    if let Some(properties) = &mut schema.properties {
        properties.values_mut().for_each(retain_keywords);
    }
    if let Some(items) = &mut schema.items {
        retain_keywords(items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_inlines_refs() {
        let doc = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "owner": {"$ref": "#/$defs/person", "description": "who owns it"},
                "reviewers": {"type": "array", "items": {"$ref": "#/definitions/person"}}
            },
            "$defs": {
                "person": {"type": "object", "properties": {"name": {"type": "string"}}}
            },
            "definitions": {
                "person": {"type": "object", "properties": {"email": {"type": "string", "format": "email"}}}
            }
        });
        let schema = import_schema(&doc).unwrap();
        let owner = schema.property("owner").unwrap();
        assert!(owner.property("name").is_some());
        assert_eq!(owner.keywords.description.as_deref(), Some("who owns it"));

        let reviewer = schema.property("reviewers").unwrap().items.as_deref().unwrap();
        assert_eq!(
            reviewer.property("email").unwrap().keywords.format,
            Some(Format::Email)
        );
        assert!(schema.definitions.is_empty());
    }

    #[test]
    fn test_import_rejects_cycles_and_foreign_refs() {
        let cyclic = json!({
            "$ref": "#/definitions/node",
            "definitions": {
                "node": {"type": "object", "properties": {"next": {"$ref": "#/definitions/node"}}}
            }
        });
        let err = import_schema(&cyclic).unwrap_err();
        assert!(matches!(
            err,
            FormError::Conversion(ConversionError::UnresolvedRef { ref path, .. })
                if path == "#/properties/next"
        ));

        let remote = json!({"$ref": "https://example.com/schema.json"});
        assert!(import_schema(&remote).unwrap_err().is_conversion());
    }

    #[test]
    fn test_import_collapses_nullable() {
        let doc = json!({
            "type": "object",
            "properties": {
                "note": {"type": ["string", "null"], "maxLength": 80},
                "size": {"anyOf": [{"type": "integer", "format": "uint32", "minimum": 0}, {"type": "null"}]}
            }
        });
        let schema = import_schema(&doc).unwrap();
        let note = schema.property("note").unwrap();
        assert_eq!(note.schema_type, SchemaType::String);
        assert_eq!(note.keywords.nullable, Some(true));
        assert_eq!(note.keywords.max_length, Some(80));

        let size = schema.property("size").unwrap();
        assert_eq!(size.schema_type, SchemaType::Integer);
        assert_eq!(size.keywords.nullable, Some(true));
        assert_eq!(size.keywords.format, None);
        assert_eq!(size.keywords.minimum, Some(serde_json::Number::from(0)));
    }

    #[test]
    fn test_import_drops_foreign_keywords_and_infers_type() {
        let doc = json!({
            "properties": {
                "tags": {"items": {"type": "string"}, "uniqueItems": true, "minLength": 3},
                "mode": {"enum": ["a", "b"]}
            },
            "required": ["tags", "missing"]
        });
        let schema = import_schema(&doc).unwrap();
        assert_eq!(schema.schema_type, SchemaType::Object);
        assert_eq!(schema.required.iter().collect::<Vec<_>>(), ["tags"]);

        let tags = schema.property("tags").unwrap();
        assert_eq!(tags.schema_type, SchemaType::Array);
        assert_eq!(tags.keywords.min_length, None);
        assert_eq!(
            schema.property("mode").unwrap().keywords.enum_values,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_import_rejects_type_unions() {
        let doc = json!({"type": ["string", "number"]});
        assert!(import_schema(&doc).unwrap_err().is_validation());
        assert!(import_schema(&json!(true)).unwrap_err().is_validation());
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    enum Recurrence {
        Never,
        Daily,
        Weekly,
    }

    #[allow(dead_code)]
    #[derive(JsonSchema)]
    struct Task {
        /// What to do.
        name: String,
        done: bool,
        recurrence: Option<Recurrence>,
        attempts: u32,
        labels: Vec<String>,
    }

    #[test]
    fn test_for_type() {
        let schema = DataSchema::for_type::<Task>().unwrap();
        assert_eq!(schema.schema_type, SchemaType::Object);

        let mut keys: Vec<_> = schema.properties.as_ref().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, ["attempts", "done", "labels", "name", "recurrence"]);
        assert!(schema.required.contains("name"));
        assert!(!schema.required.contains("recurrence"));

        let name = schema.property("name").unwrap();
        assert_eq!(name.keywords.description.as_deref(), Some("What to do."));

        let recurrence = schema.property("recurrence").unwrap();
        assert_eq!(recurrence.schema_type, SchemaType::String);
        assert_eq!(recurrence.keywords.nullable, Some(true));
        assert_eq!(
            recurrence.keywords.enum_values.as_deref(),
            Some(&["Never".to_string(), "Daily".to_string(), "Weekly".to_string()][..])
        );

        let labels = schema.property("labels").unwrap();
        assert_eq!(
            labels.items.as_deref().map(|i| i.schema_type),
            Some(SchemaType::String)
        );
        assert_eq!(
            schema.property("attempts").unwrap().schema_type,
            SchemaType::Integer
        );
    }
}
