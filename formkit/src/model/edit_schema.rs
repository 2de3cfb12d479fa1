use serde::{Deserialize, Serialize};

use super::{Keywords, SchemaType};
use crate::error::ConversionError;

/// List-ordered editing projection of a [`DataSchema`](super::DataSchema).
///
/// Each record in `properties` and `definitions` carries its own key as
/// `title`, the property's own display title as `displayTitle` and its
/// required flag as `required`. The `type` tag is kept as
/// free text so that half-filled rows coming back from a form survive until
/// they are folded into canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditSchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "displayTitle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_title: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<EditSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<EditSchema>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<EditSchema>,
    #[serde(flatten)]
    pub keywords: Keywords,
}

impl EditSchema {
    /// `{"type": "object", "properties": []}`
    pub fn object() -> Self {
        EditSchema {
            schema_type: Some(SchemaType::Object.to_string()),
            properties: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// A bare node of the given type.
    pub fn of_type(ty: SchemaType) -> Self {
        EditSchema {
            schema_type: Some(ty.to_string()),
            ..Default::default()
        }
    }

    /// A property record.
    pub fn record(title: impl Into<String>, ty: SchemaType) -> Self {
        EditSchema {
            title: Some(title.into()),
            ..EditSchema::of_type(ty)
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_record(mut self, record: EditSchema) -> Self {
        self.properties.get_or_insert_with(Vec::new).push(record);
        self
    }

    pub fn with_items(mut self, items: EditSchema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// Parsed `type` tag; `None` when the tag is absent or blank.
    pub fn type_tag(&self, path: &str) -> Result<Option<SchemaType>, ConversionError> {
        match self.schema_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(tag) => SchemaType::from_tag(tag, path).map(Some),
        }
    }

    /// The record title, if it is non-empty.
    pub fn key(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// A record is complete when it has a non-empty title and a type tag.
    ///
    /// Incomplete records are tolerated while editing and dropped when the
    /// schema is folded back into canonical form.
    pub fn is_complete(&self) -> bool {
        self.key().is_some()
            && self
                .schema_type
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }

    /// Record by title.
    pub fn record_by_title(&self, title: &str) -> Option<&EditSchema> {
        self.properties
            .as_deref()
            .and_then(|records| records.iter().find(|r| r.key() == Some(title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serialization() {
        let record = EditSchema::record("name", SchemaType::String).with_required(true);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"type": "string", "title": "name", "required": true})
        );

        let optional = EditSchema::record("note", SchemaType::String);
        assert_eq!(
            serde_json::to_value(&optional).unwrap(),
            json!({"type": "string", "title": "note"})
        );
    }

    #[test]
    fn test_completeness() {
        assert!(EditSchema::record("a", SchemaType::Null).is_complete());
        assert!(!EditSchema::record("", SchemaType::Null).is_complete());
        assert!(!EditSchema::of_type(SchemaType::String).is_complete());

        let untyped = EditSchema {
            title: Some("a".into()),
            schema_type: Some("  ".into()),
            ..Default::default()
        };
        assert!(!untyped.is_complete());
        assert_eq!(untyped.type_tag("#").unwrap(), None);
    }

    #[test]
    fn test_unknown_tag_is_reported() {
        let record = EditSchema {
            title: Some("when".into()),
            schema_type: Some("date".into()),
            ..Default::default()
        };
        assert!(record.is_complete());
        assert_eq!(
            record.type_tag("#/properties/0"),
            Err(ConversionError::UnknownType {
                path: "#/properties/0".into(),
                tag: "date".into()
            })
        );
    }
}
