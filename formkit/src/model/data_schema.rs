use std::{fmt, str::FromStr};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::{
    error::{ConversionError, FormError, Result},
    utils::escape_pointer,
};

/// The reduced set of JSON Schema `type` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// All recognized tags, in the order editors list them.
    pub const ALL: [SchemaType; 7] = [
        SchemaType::Object,
        SchemaType::Array,
        SchemaType::String,
        SchemaType::Number,
        SchemaType::Integer,
        SchemaType::Boolean,
        SchemaType::Null,
    ];

    /// The JSON spelling of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }

    /// Parse a tag found at `path`.
    pub fn from_tag(tag: &str, path: &str) -> Result<Self, ConversionError> {
        SchemaType::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| ConversionError::UnknownType {
                path: path.to_string(),
                tag: tag.to_string(),
            })
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaType::from_tag(s, "#")
    }
}

/// String formats understood by the form renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Email,
    Password,
    Uri,
    DateTime,
    Hostname,
    Ipv4,
    Ipv6,
    UriReference,
    JsonPointer,
    RelativeJsonPointer,
    Regex,
    Date,
    Time,
    Uuid,
    UriTemplate,
    IdnEmail,
    IdnHostname,
}

impl Format {
    pub const ALL: [Format; 17] = [
        Format::Email,
        Format::Password,
        Format::Uri,
        Format::DateTime,
        Format::Hostname,
        Format::Ipv4,
        Format::Ipv6,
        Format::UriReference,
        Format::JsonPointer,
        Format::RelativeJsonPointer,
        Format::Regex,
        Format::Date,
        Format::Time,
        Format::Uuid,
        Format::UriTemplate,
        Format::IdnEmail,
        Format::IdnHostname,
    ];

    /// The JSON spelling of the format.
    pub fn name(&self) -> String {
        match serde_json::to_value(self) {
            Ok(Value::String(name)) => name,
            _ => format!("{self:?}"),
        }
    }

    /// Look up a format by its JSON spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }
}

/// Keywords shared by [`DataSchema`] and [`EditSchema`](super::EditSchema).
///
/// Which of these apply depends on the node's type; see
/// [`Keywords::retain_for`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keywords {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "some_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    // object
    #[serde(
        default,
        deserialize_with = "some_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Value>,

    // array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    // string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    // number and integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
}

// Keeps an explicit `null` as `Some(Value::Null)` instead of `None`.
pub(crate) fn some_value<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Keywords {
    /// Drop every keyword that has no meaning for `ty`, and normalize an
    /// empty `enum` to absent.
    pub fn retain_for(&mut self, ty: SchemaType) {
        if ty != SchemaType::Object {
            self.additional_properties = None;
        }
        if ty != SchemaType::Array {
            self.min_items = None;
            self.max_items = None;
        }
        if ty != SchemaType::String {
            self.min_length = None;
            self.max_length = None;
            self.pattern = None;
            self.format = None;
            self.enum_values = None;
        }
        if !matches!(ty, SchemaType::Number | SchemaType::Integer) {
            self.minimum = None;
            self.maximum = None;
            self.exclusive_minimum = None;
            self.exclusive_maximum = None;
            self.multiple_of = None;
        }
        if self.enum_values.as_ref().is_some_and(Vec::is_empty) {
            self.enum_values = None;
        }
    }

    /// Copy of `self` restricted to `ty`.
    pub fn for_type(&self, ty: SchemaType) -> Keywords {
        let mut kw = self.clone();
        kw.retain_for(ty);
        kw
    }
}

/// Canonical, map-keyed data schema.
///
/// `properties`, `required` and `definitions` belong to objects, `items` to
/// arrays. [`DataSchema::validate`] rejects them anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, DataSchema>>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<DataSchema>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, DataSchema>,
    #[serde(flatten)]
    pub keywords: Keywords,
}

impl Default for DataSchema {
    /// `{"type": "object", "properties": {}}`
    fn default() -> Self {
        let mut schema = DataSchema::new(SchemaType::Object);
        schema.properties = Some(IndexMap::new());
        schema
    }
}

impl DataSchema {
    /// A bare node of the given type.
    pub fn new(schema_type: SchemaType) -> Self {
        DataSchema {
            schema_type,
            title: None,
            properties: None,
            required: IndexSet::new(),
            items: None,
            definitions: IndexMap::new(),
            keywords: Keywords::default(),
        }
    }

    /// An object node with an empty property map.
    pub fn object() -> Self {
        DataSchema::default()
    }

    /// An array node with the given item schema.
    pub fn array(items: DataSchema) -> Self {
        DataSchema::new(SchemaType::Array).with_items(items)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a property, creating the property map when needed.
    pub fn with_property(mut self, key: impl Into<String>, schema: DataSchema) -> Self {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), schema);
        self
    }

    /// Append a property and mark it required.
    pub fn with_required_property(self, key: impl Into<String>, schema: DataSchema) -> Self {
        let key = key.into();
        let mut this = self.with_property(key.clone(), schema);
        this.required.insert(key);
        this
    }

    pub fn with_items(mut self, items: DataSchema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_definition(mut self, key: impl Into<String>, schema: DataSchema) -> Self {
        self.definitions.insert(key.into(), schema);
        self
    }

    pub fn with_keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// Property sub-schema by key.
    pub fn property(&self, key: &str) -> Option<&DataSchema> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Check the structural invariants of the whole tree.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("#")
    }

    fn validate_at(&self, path: &str) -> Result<()> {
        let ty = self.schema_type;
        if ty != SchemaType::Object {
            if self.properties.is_some() {
                return Err(misplaced(path, "properties", ty));
            }
            if !self.required.is_empty() {
                return Err(misplaced(path, "required", ty));
            }
            if !self.definitions.is_empty() {
                return Err(misplaced(path, "definitions", ty));
            }
        }
        if ty != SchemaType::Array && self.items.is_some() {
            return Err(misplaced(path, "items", ty));
        }

        for key in &self.required {
            if self.property(key).is_none() {
                return Err(FormError::validation(
                    path,
                    format!("required key `{key}` is not a property"),
                ));
            }
        }

        if let Some(properties) = &self.properties {
            for (key, sub) in properties {
                sub.validate_at(&format!("{path}/properties/{}", escape_pointer(key)))?;
            }
        }
        for (key, sub) in &self.definitions {
            sub.validate_at(&format!("{path}/definitions/{}", escape_pointer(key)))?;
        }
        if let Some(items) = &self.items {
            items.validate_at(&format!("{path}/items"))?;
        }
        Ok(())
    }
}

fn misplaced(path: &str, keyword: &str, ty: SchemaType) -> FormError {
    FormError::validation(path, format!("`{keyword}` is not allowed on type `{ty}`"))
}
