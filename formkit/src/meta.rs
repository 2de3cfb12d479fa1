//! Schemas that drive the structured editors themselves.
//!
//! The schema editor renders an [`EditSchema`](crate::model::EditSchema)
//! record with [`editing_schema`] and [`editing_uischema`]; the layout editor
//! renders a [`UiSchema`] element with [`ui_editing_schema`] and
//! [`ui_editing_uischema`]. Both recurse through `#/definitions/property`.

use serde_json::{Value, json};

use crate::{
    error::Result,
    model::{
        Control, ControlLabel, DataSchema, Document, FormSchema, Format, Keywords, Rule,
        SchemaType, UiSchema,
    },
    utils::deep_merge,
};

const PROPERTY_REF: &str = "#/definitions/property";

const UI_KINDS: [&str; 7] = [
    "Categorization",
    "Category",
    "Group",
    "Control",
    "Label",
    "VerticalLayout",
    "HorizontalLayout",
];

fn labeled(ty: SchemaType, title: &str) -> DataSchema {
    DataSchema::new(ty).with_title(title)
}

fn nullable(mut schema: DataSchema) -> DataSchema {
    schema.keywords.nullable = Some(true);
    schema
}

fn property_ref() -> DataSchema {
    DataSchema::new(SchemaType::Object).with_keywords(Keywords {
        reference: Some(PROPERTY_REF.to_string()),
        ..Default::default()
    })
}

fn string_list(title: &str) -> DataSchema {
    DataSchema::array(DataSchema::new(SchemaType::String)).with_title(title)
}

fn one_of(ty: SchemaType, title: &str, values: impl IntoIterator<Item = String>) -> DataSchema {
    let mut schema = labeled(ty, title);
    schema.keywords.enum_values = Some(values.into_iter().collect());
    schema
}

fn editing_record() -> DataSchema {
    let mut title = labeled(SchemaType::String, "Title");
    title.keywords.description = Some("The key of the field.".into());

    let mut ty = one_of(
        SchemaType::String,
        "Type",
        SchemaType::ALL.iter().map(|t| t.to_string()),
    );
    ty.keywords.description = Some("The type of the data this field defines.".into());
    ty.keywords.default = Some(json!("string"));

    let mut properties = DataSchema::array(property_ref()).with_title("Properties");
    properties.keywords.default = Some(json!([]));

    DataSchema::object()
        .with_property("title", title)
        .with_property(
            "displayTitle",
            labeled(SchemaType::String, "Display Title"),
        )
        .with_required_property("type", ty)
        .with_property("required", labeled(SchemaType::Boolean, "Required"))
        .with_property("description", labeled(SchemaType::String, "Description"))
        .with_property("properties", properties)
        .with_property("items", property_ref().with_title("Items"))
        .with_property("minLength", labeled(SchemaType::Integer, "Minimum Length"))
        .with_property("maxLength", labeled(SchemaType::Integer, "Maximum Length"))
        .with_property("pattern", labeled(SchemaType::String, "Pattern"))
        .with_property(
            "format",
            one_of(
                SchemaType::String,
                "Format",
                Format::ALL.iter().map(Format::name),
            ),
        )
        .with_property("enum", string_list("Enum"))
        .with_property("minimum", labeled(SchemaType::Number, "Minimum Value"))
        .with_property("maximum", labeled(SchemaType::Number, "Maximum Value"))
}

/// Schema of an edit-schema record, recursing through
/// `#/definitions/property`.
pub fn editing_schema() -> DataSchema {
    editing_record().with_definition("property", editing_record())
}

fn type_is(tags: &[&str]) -> Rule {
    let schema = match tags {
        [tag] => json!({ "const": tag }),
        tags => json!({ "enum": tags }),
    };
    Rule::show_when("#/properties/type", schema)
}

/// Layout for [`editing_schema`]: constraint groups appear only for the
/// types they apply to.
pub fn editing_uischema() -> UiSchema {
    let string = || type_is(&["string"]);
    let number = || type_is(&["number", "integer"]);
    let object = || type_is(&["object"]);

    UiSchema::group(
        "Property",
        vec![
            UiSchema::horizontal(vec![
                UiSchema::control("#/properties/title"),
                UiSchema::control("#/properties/type"),
                UiSchema::control("#/properties/required"),
            ]),
            UiSchema::horizontal(vec![
                UiSchema::control("#/properties/displayTitle"),
                UiSchema::control("#/properties/description"),
            ]),
            UiSchema::horizontal(vec![
                UiSchema::control("#/properties/minLength"),
                UiSchema::control("#/properties/maxLength"),
            ])
            .with_rule(string()),
            UiSchema::horizontal(vec![
                UiSchema::control("#/properties/pattern"),
                UiSchema::control("#/properties/format"),
            ])
            .with_rule(string()),
            UiSchema::control("#/properties/enum").with_rule(string()),
            UiSchema::horizontal(vec![
                UiSchema::control("#/properties/minimum"),
                UiSchema::control("#/properties/maximum"),
            ])
            .with_rule(number()),
            UiSchema::control("#/properties/properties").with_rule(object()),
            UiSchema::control("#/properties/items").with_rule(type_is(&["array"])),
        ],
    )
}

fn ui_record() -> DataSchema {
    let elements = nullable(DataSchema::array(property_ref()).with_title("Elements"));
    let options = nullable(
        DataSchema::object()
            .with_title("Options")
            .with_property("multi", nullable(labeled(SchemaType::Boolean, "Multiline")))
            .with_property(
                "detail",
                nullable(DataSchema::array(property_ref()).with_title("Detail")),
            ),
    );

    DataSchema::object()
        .with_required_property(
            "type",
            one_of(
                SchemaType::String,
                "Type",
                UI_KINDS.iter().map(|k| k.to_string()),
            ),
        )
        .with_property("label", nullable(labeled(SchemaType::String, "Label")))
        .with_property("scope", nullable(labeled(SchemaType::String, "Scope")))
        .with_property("elements", elements)
        .with_property("options", options)
}

/// Schema of a layout element for the layout editor.
///
/// `scopes` become the choices for every `scope` field; with no scopes the
/// field is free text.
pub fn ui_editing_schema(scopes: &[String]) -> Result<DataSchema> {
    let base = ui_record()
        .with_definition("property", ui_record())
        .to_value()?;
    let choices = if scopes.is_empty() {
        Value::Null
    } else {
        json!(scopes)
    };
    let overlay = json!({
        "properties": { "scope": { "enum": choices.clone() } },
        "definitions": {
            "property": { "properties": { "scope": { "enum": choices } } }
        }
    });
    DataSchema::from_value(deep_merge(&base, &overlay))
}

/// Layout for [`ui_editing_schema`].
pub fn ui_editing_uischema() -> UiSchema {
    let kind_is = |kinds: &[&str]| Rule::show_when("#/properties/type", json!({ "enum": kinds }));
    let control_only = || kind_is(&["Control"]);

    UiSchema::vertical(vec![
        UiSchema::control("#/properties/type"),
        UiSchema::control("#/properties/label")
            .with_rule(kind_is(&["Category", "Group", "Control", "Label"])),
        UiSchema::control("#/properties/scope").with_rule(control_only()),
        UiSchema::control("#/properties/elements").with_rule(kind_is(&[
            "Categorization",
            "Category",
            "Group",
            "VerticalLayout",
            "HorizontalLayout",
        ])),
        UiSchema::control("#/properties/options/properties/multi").with_rule(control_only()),
        UiSchema::control("#/properties/options/properties/detail").with_rule(control_only()),
    ])
}

/// A small to-do form, used as a starting point and in tests.
pub fn sample_form() -> FormSchema {
    let name = DataSchema::new(SchemaType::String).with_keywords(Keywords {
        min_length: Some(1),
        ..Default::default()
    });
    let due_date = DataSchema::new(SchemaType::String).with_keywords(Keywords {
        format: Some(Format::Date),
        ..Default::default()
    });
    let recurrence = DataSchema::new(SchemaType::String).with_keywords(Keywords {
        enum_values: Some(
            ["Never", "Daily", "Weekly", "Monthly"]
                .map(String::from)
                .to_vec(),
        ),
        ..Default::default()
    });
    let schema = DataSchema::object()
        .with_required_property("name", name)
        .with_property("done", DataSchema::new(SchemaType::Boolean))
        .with_required_property("due_date", due_date)
        .with_property("recurrence", recurrence);

    let done = UiSchema::Control(Control {
        scope: "#/properties/done".into(),
        label: Some(ControlLabel::Show(false)),
        i18n: None,
        rule: None,
        options: None,
    });
    let uischema = UiSchema::vertical(vec![
        done,
        UiSchema::control("#/properties/name"),
        UiSchema::horizontal(vec![
            UiSchema::control("#/properties/due_date"),
            UiSchema::control("#/properties/recurrence"),
        ]),
    ]);
    FormSchema::new(schema, uischema)
}
