use indexmap::{IndexMap, IndexSet};

use super::Converter;
use crate::{
    error::{ConversionError, Result},
    model::{DataSchema, EditSchema, SchemaType},
    utils::escape_pointer,
};

/// Convert a canonical schema into its list-ordered editing form.
///
/// Property and definition maps become record lists in key order, each
/// record titled with its key and keeping the sub-schema's own title as
/// `displayTitle`; `required` membership becomes a per-record flag. An
/// array without `items` is edited as an array of `null`.
/// Keywords that do not apply to a node's type are dropped, as is an empty
/// `enum`.
pub fn to_editable(schema: &DataSchema) -> Result<EditSchema, ConversionError> {
    editable_node(schema, "#")
}

/// Fold an edit schema back into canonical form.
///
/// Records without a title or a type are skipped, and `required` is rebuilt
/// from the flags of the records that remain. Record order is not kept
/// beyond the insertion order of the resulting maps.
pub fn to_canonical(schema: &EditSchema) -> Result<DataSchema, ConversionError> {
    canonical_node(schema, "#")
}

fn editable_node(schema: &DataSchema, path: &str) -> Result<EditSchema, ConversionError> {
    let ty = schema.schema_type;
    let mut node = EditSchema {
        schema_type: Some(ty.to_string()),
        title: schema.title.clone(),
        keywords: schema.keywords.for_type(ty),
        ..Default::default()
    };

    match ty {
        SchemaType::Object => {
            if let Some(key) = schema
                .required
                .iter()
                .find(|key| schema.property(key).is_none())
            {
                return Err(ConversionError::DanglingRequired {
                    path: path.to_string(),
                    key: key.clone(),
                });
            }
            if let Some(properties) = &schema.properties {
                node.properties = Some(records(
                    properties,
                    Some(&schema.required),
                    &format!("{path}/properties"),
                )?);
            }
            node.definitions = records(&schema.definitions, None, &format!("{path}/definitions"))?;
        }
        SchemaType::Array => {
            let items = match &schema.items {
                Some(items) => editable_node(items, &format!("{path}/items"))?,
                None => EditSchema::of_type(SchemaType::Null),
            };
            node.items = Some(Box::new(items));
        }
        _ => {}
    }
    Ok(node)
}

fn records(
    map: &IndexMap<String, DataSchema>,
    required: Option<&IndexSet<String>>,
    path: &str,
) -> Result<Vec<EditSchema>, ConversionError> {
    map.iter()
        .map(|(key, sub)| {
            let mut record = editable_node(sub, &format!("{path}/{}", escape_pointer(key)))?;
            record.display_title = record.title.replace(key.clone());
            record.required = required.is_some_and(|r| r.contains(key));
            Ok(record)
        })
        .collect()
}

fn canonical_node(edit: &EditSchema, path: &str) -> Result<DataSchema, ConversionError> {
    let ty = edit
        .type_tag(path)?
        .ok_or_else(|| ConversionError::MissingType {
            path: path.to_string(),
        })?;

    let mut schema = DataSchema::new(ty).with_keywords(edit.keywords.for_type(ty));
    schema.title = edit.title.clone();

    match ty {
        SchemaType::Object => {
            if let Some(list) = &edit.properties {
                let (properties, required) = fold(list, &format!("{path}/properties"))?;
                schema.properties = Some(properties);
                schema.required = required;
            }
            // `required` has no meaning for definitions
            schema.definitions = fold(&edit.definitions, &format!("{path}/definitions"))?.0;
        }
        SchemaType::Array => {
            let items = match &edit.items {
                Some(items) => canonical_node(items, &format!("{path}/items"))?,
                None => DataSchema::new(SchemaType::Null),
            };
            schema.items = Some(Box::new(items));
        }
        _ => {}
    }
    Ok(schema)
}

fn fold(
    list: &[EditSchema],
    path: &str,
) -> Result<(IndexMap<String, DataSchema>, IndexSet<String>), ConversionError> {
    let mut map = IndexMap::new();
    let mut required = IndexSet::new();

    for (i, record) in list.iter().enumerate() {
        let Some(key) = record.key().filter(|_| record.is_complete()) else {
            trace!("skipping incomplete record {path}/{i}");
            continue;
        };
        let key_path = format!("{path}/{}", escape_pointer(key));
        let mut sub = canonical_node(record, &key_path)?;
        sub.title = record.display_title.clone();
        if map.insert(key.to_string(), sub).is_some() {
            return Err(ConversionError::DuplicateKey {
                path: path.to_string(),
                key: key.to_string(),
            });
        }
        if record.required {
            required.insert(key.to_string());
        }
    }
    Ok((map, required))
}

/// [`Converter`] between a stored [`DataSchema`] and the [`EditSchema`]
/// a list-based editor works on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaConverter;

impl Converter for SchemaConverter {
    type External = DataSchema;
    type Internal = EditSchema;

    fn to_internal(&self, external: &DataSchema) -> Result<EditSchema> {
        debug!("converting data schema to edit schema");
        Ok(to_editable(external)?)
    }

    fn to_external(&self, internal: &EditSchema) -> Result<DataSchema> {
        debug!("folding edit schema into data schema");
        Ok(to_canonical(internal)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Format, Keywords};
    use serde_json::json;

    fn task_schema() -> DataSchema {
        DataSchema::object()
            .with_required_property(
                "name",
                DataSchema::new(SchemaType::String).with_keywords(Keywords {
                    min_length: Some(1),
                    ..Default::default()
                }),
            )
            .with_property("done", DataSchema::new(SchemaType::Boolean))
            .with_required_property(
                "due_date",
                DataSchema::new(SchemaType::String).with_keywords(Keywords {
                    format: Some(Format::Date),
                    ..Default::default()
                }),
            )
            .with_property(
                "links",
                DataSchema::array(
                    DataSchema::object()
                        .with_required_property("uri", DataSchema::new(SchemaType::String)),
                ),
            )
    }

    #[test]
    fn test_to_editable_orders_records() {
        let edit = to_editable(&task_schema()).unwrap();
        let titles: Vec<_> = edit
            .properties
            .as_ref()
            .unwrap()
            .iter()
            .map(|r| r.key().unwrap())
            .collect();
        assert_eq!(titles, ["name", "done", "due_date", "links"]);

        let name = edit.record_by_title("name").unwrap();
        assert!(name.required);
        assert_eq!(name.keywords.min_length, Some(1));
        assert!(!edit.record_by_title("done").unwrap().required);

        let links = edit.record_by_title("links").unwrap();
        let items = links.items.as_ref().unwrap();
        assert!(items.record_by_title("uri").unwrap().required);
    }

    #[test]
    fn test_round_trip() {
        let schema = task_schema()
            .with_title("Task")
            .with_definition("tag", DataSchema::new(SchemaType::String));
        let edit = to_editable(&schema).unwrap();
        assert_eq!(to_canonical(&edit).unwrap(), schema);
        assert_eq!(to_editable(&to_canonical(&edit).unwrap()).unwrap(), edit);
    }

    #[test]
    fn test_property_titles_survive() {
        let schema = DataSchema::parse(
            r#"{"type":"object","properties":{"name":{"type":"string","title":"Full name"}}}"#,
        )
        .unwrap();
        let edit = to_editable(&schema).unwrap();
        let record = edit.record_by_title("name").unwrap();
        assert_eq!(record.display_title.as_deref(), Some("Full name"));

        let back = to_canonical(&edit).unwrap();
        assert_eq!(
            back.property("name").unwrap().title.as_deref(),
            Some("Full name")
        );
        assert_eq!(back, schema);
    }

    #[test]
    fn test_incomplete_records_are_dropped() {
        let edit = EditSchema::object()
            .with_record(EditSchema::record("a", SchemaType::String).with_required(true))
            .with_record(EditSchema::record("", SchemaType::Number).with_required(true))
            .with_record(EditSchema {
                title: Some("untyped".into()),
                required: true,
                ..Default::default()
            });
        let schema = to_canonical(&edit).unwrap();
        let keys: Vec<_> = schema.properties.as_ref().unwrap().keys().collect();
        assert_eq!(keys, ["a"]);
        assert_eq!(schema.required.iter().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn test_unknown_and_missing_types() {
        let edit = EditSchema::object().with_record(EditSchema {
            title: Some("when".into()),
            schema_type: Some("date".into()),
            ..Default::default()
        });
        assert_eq!(
            to_canonical(&edit),
            Err(ConversionError::UnknownType {
                path: "#/properties/when".into(),
                tag: "date".into()
            })
        );

        let untyped_items = EditSchema::of_type(SchemaType::Array).with_items(EditSchema::default());
        assert_eq!(
            to_canonical(&untyped_items),
            Err(ConversionError::MissingType {
                path: "#/items".into()
            })
        );
    }

    #[test]
    fn test_duplicate_titles() {
        let edit = EditSchema::object()
            .with_record(EditSchema::record("a", SchemaType::String))
            .with_record(EditSchema::record("a", SchemaType::Number));
        assert!(matches!(
            to_canonical(&edit),
            Err(ConversionError::DuplicateKey { ref key, .. }) if key == "a"
        ));
    }

    #[test]
    fn test_empty_enum_is_dropped() {
        let schema = DataSchema::object().with_property(
            "mood",
            DataSchema::new(SchemaType::String).with_keywords(Keywords {
                enum_values: Some(vec![]),
                ..Default::default()
            }),
        );
        let edit = to_editable(&schema).unwrap();
        assert_eq!(edit.record_by_title("mood").unwrap().keywords.enum_values, None);
        let back = to_canonical(&edit).unwrap();
        assert_eq!(back.property("mood").unwrap().keywords.enum_values, None);
        assert!(!serde_json::to_string(&back).unwrap().contains("enum"));
    }

    #[test]
    fn test_array_without_items_becomes_null_items() {
        let schema = DataSchema::new(SchemaType::Array);
        let edit = to_editable(&schema).unwrap();
        assert_eq!(edit.items.as_deref(), Some(&EditSchema::of_type(SchemaType::Null)));

        let back = to_canonical(&EditSchema::of_type(SchemaType::Array)).unwrap();
        assert_eq!(back.items.as_deref(), Some(&DataSchema::new(SchemaType::Null)));
    }

    #[test]
    fn test_foreign_keywords_are_dropped() {
        let schema: DataSchema = serde_json::from_value(json!({
            "type": "integer",
            "minimum": 1,
            "minLength": 3,
            "pattern": "^x$"
        }))
        .unwrap();
        let edit = to_editable(&schema).unwrap();
        assert_eq!(edit.keywords.minimum, Some(serde_json::Number::from(1)));
        let text = serde_json::to_string(&to_canonical(&edit).unwrap()).unwrap();
        assert!(text.contains("\"minimum\":1"));
        assert!(!text.contains("1.0"));
        assert_eq!(edit.keywords.min_length, None);
        assert_eq!(edit.keywords.pattern, None);
    }

    #[test]
    fn test_dangling_required() {
        let mut schema = DataSchema::object();
        schema.required.insert("ghost".into());
        assert_eq!(
            to_editable(&schema),
            Err(ConversionError::DanglingRequired {
                path: "#".into(),
                key: "ghost".into()
            })
        );
    }

    #[test]
    fn test_edit_schema_from_form_json() {
        let edit: EditSchema = serde_json::from_value(json!({
            "type": "object",
            "properties": [
                {"title": "count", "type": "integer", "minimum": 0, "required": true},
                {"title": "draft row"}
            ]
        }))
        .unwrap();
        let schema = to_canonical(&edit).unwrap();
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {"count": {"type": "integer", "minimum": 0.0}},
                "required": ["count"]
            })
        );
    }
}
