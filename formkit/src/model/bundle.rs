use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DataSchema, Document, UiSchema};
use crate::{
    convert::scope::resolve_scope,
    error::{FormError, Result},
};

/// A stored form design: the data schema, its main layout and any extra
/// layouts registered for nested objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub schema: DataSchema,
    pub uischema: UiSchema,
    #[serde(default)]
    pub uischemas: Vec<UiSchema>,
}

impl FormSchema {
    pub fn new(schema: DataSchema, uischema: UiSchema) -> Self {
        FormSchema {
            schema,
            uischema,
            uischemas: Vec::new(),
        }
    }

    /// Control and rule scopes of the main layout that do not resolve
    /// against the data schema.
    pub fn unresolved_scopes(&self) -> Vec<String> {
        self.uischema
            .scopes()
            .into_iter()
            .filter(|scope| resolve_scope(&self.schema, scope).is_none())
            .map(str::to_string)
            .collect()
    }
}

impl Document for FormSchema {
    const KIND: &'static str = "form schema";

    /// Missing top-level members are taken from [`FormSchema::default`]
    /// before the shape is checked.
    fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(FormError::validation("#", "form schema must be an object"));
        };
        let defaults = serde_json::to_value(FormSchema::default())
            .map_err(|e| FormError::validation("#", e.to_string()))?;
        if let Value::Object(defaults) = defaults {
            for (key, value) in defaults {
                map.entry(key).or_insert(value);
            }
        }
        let bundle: FormSchema = serde_json::from_value(Value::Object(map))
            .map_err(|e| FormError::validation("#", e.to_string()))?;
        bundle.check()?;
        Ok(bundle)
    }

    fn check(&self) -> Result<()> {
        self.schema.validate()?;
        self.uischema.validate()?;
        for (i, ui) in self.uischemas.iter().enumerate() {
            ui.validate().map_err(|e| match e {
                FormError::Validation { path, message } => FormError::Validation {
                    path: format!("uischemas/{i}{}", path.trim_start_matches('#')),
                    message,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SchemaType;

    #[test]
    fn test_missing_members_use_defaults() {
        let bundle = FormSchema::parse(r#"{"schema": {"type": "object", "properties": {"a": {"type": "string"}}}}"#)
            .unwrap();
        assert_eq!(bundle.uischema, UiSchema::default());
        assert!(bundle.uischemas.is_empty());
        assert_eq!(bundle.schema.property("a").map(|s| s.schema_type), Some(SchemaType::String));

        assert_eq!(FormSchema::parse("{}").unwrap(), FormSchema::default());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(FormSchema::parse("[]").unwrap_err().is_validation());
        assert!(FormSchema::parse("{").unwrap_err().is_syntax());
    }

    #[test]
    fn test_unresolved_scopes() {
        let bundle = FormSchema::new(
            DataSchema::object().with_property("a", DataSchema::new(SchemaType::String)),
            UiSchema::vertical(vec![
                UiSchema::control("#/properties/a"),
                UiSchema::control("#/properties/b"),
            ]),
        );
        assert_eq!(bundle.unresolved_scopes(), vec!["#/properties/b".to_string()]);
    }
}
