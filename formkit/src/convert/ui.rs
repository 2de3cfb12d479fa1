use super::{Converter, Identity};
use crate::{
    convert::scope::resolve_scope,
    error::{ConversionError, Result},
    model::{DataSchema, UiSchema},
};

/// Pass-through converter for layout editors that need no projection.
pub type UiIdentity = Identity<UiSchema>;

/// Fail on the first control or rule scope in `ui` that does not resolve
/// against `schema`.
pub fn check_scopes(ui: &UiSchema, schema: &DataSchema) -> Result<(), ConversionError> {
    match ui
        .scopes()
        .into_iter()
        .find(|scope| resolve_scope(schema, scope).is_none())
    {
        Some(scope) => Err(ConversionError::UnresolvedScope {
            scope: scope.to_string(),
        }),
        None => Ok(()),
    }
}

/// Identity converter over [`UiSchema`] that refuses to store a layout
/// whose scopes do not resolve against the paired data schema.
///
/// Reading is never rejected: a stored layout that has drifted from its
/// schema can still be opened and repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeGuard {
    schema: DataSchema,
}

impl ScopeGuard {
    pub fn new(schema: DataSchema) -> Self {
        ScopeGuard { schema }
    }
}

impl Converter for ScopeGuard {
    type External = UiSchema;
    type Internal = UiSchema;

    fn to_internal(&self, external: &UiSchema) -> Result<UiSchema> {
        Ok(external.clone())
    }

    fn to_external(&self, internal: &UiSchema) -> Result<UiSchema> {
        check_scopes(internal, &self.schema)?;
        Ok(internal.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FormError,
        model::{Condition, Effect, Rule, SchemaType},
    };
    use serde_json::json;

    fn schema() -> DataSchema {
        DataSchema::object()
            .with_property("name", DataSchema::new(SchemaType::String))
            .with_property("done", DataSchema::new(SchemaType::Boolean))
    }

    #[test]
    fn test_guard_accepts_resolvable_layout() {
        let guard = ScopeGuard::new(schema());
        let ui = UiSchema::vertical(vec![
            UiSchema::control("#/properties/name"),
            UiSchema::label("Done?"),
            UiSchema::control("#/properties/done"),
        ]);
        assert_eq!(guard.to_external(&ui).unwrap(), ui);
        assert_eq!(guard.to_internal(&ui).unwrap(), ui);
    }

    #[test]
    fn test_guard_rejects_unknown_scope() {
        let guard = ScopeGuard::new(schema());
        let ui = UiSchema::horizontal(vec![UiSchema::control("#/properties/due")]);
        assert_eq!(
            guard.to_external(&ui),
            Err(FormError::Conversion(ConversionError::UnresolvedScope {
                scope: "#/properties/due".into()
            }))
        );
        // reading is unaffected
        assert!(guard.to_internal(&ui).is_ok());
    }

    #[test]
    fn test_rule_scopes_are_checked() {
        let mut control = UiSchema::control("#/properties/name");
        if let UiSchema::Control(c) = &mut control {
            c.rule = Some(Rule {
                effect: Effect::Hide,
                condition: Condition::Schema {
                    scope: "#/properties/archived".into(),
                    schema: json!({"const": true}),
                    fail_when_undefined: None,
                },
            });
        }
        let ui = UiSchema::vertical(vec![control]);
        assert!(matches!(
            check_scopes(&ui, &schema()),
            Err(ConversionError::UnresolvedScope { ref scope }) if scope == "#/properties/archived"
        ));
    }

    #[test]
    fn test_identity() {
        let ui = UiSchema::vertical(vec![UiSchema::control("#/properties/whatever")]);
        let id = UiIdentity::new();
        assert_eq!(id.to_external(&ui).unwrap(), ui);
    }
}
