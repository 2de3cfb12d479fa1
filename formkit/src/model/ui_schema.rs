use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::data_schema::some_value;
use crate::error::{FormError, Result};

/// Layout and control tree describing how a data schema is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiSchema {
    VerticalLayout(Layout),
    HorizontalLayout(Layout),
    Group(LabeledLayout),
    Category(LabeledLayout),
    Categorization(LabeledLayout),
    Control(Control),
    Label(LabelElement),
}

/// Elements of a plain layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub elements: Vec<UiSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

/// Elements of a layout that carries a caption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledLayout {
    pub elements: Vec<UiSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ControlLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

/// A control bound to a data-schema node by `scope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ControlLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelElement {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

/// `label` of a control or a captioned layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlLabel {
    Text(String),
    Show(bool),
    Description(LabelDescription),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
}

/// Show/hide/enable/disable rule attached to an element.
///
/// Rules are stored and transported, never evaluated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub effect: Effect,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    Hide,
    Show,
    Enable,
    Disable,
}

/// Rule condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConditionRepr", into = "ConditionRepr")]
pub enum Condition {
    /// Compare the value at `scope` with `expected_value`; `None` compares
    /// against an undefined value, which is not the same as `null`.
    Leaf {
        scope: String,
        expected_value: Option<Value>,
    },
    /// Validate the value at `scope` against `schema`.
    Schema {
        scope: String,
        schema: Value,
        fail_when_undefined: Option<bool>,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

// Wire shape: LEAF/AND/OR are tagged by `type`, schema-based conditions are not.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ConditionRepr {
    Tagged(TaggedCondition),
    Schema(SchemaCondition),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum TaggedCondition {
    #[serde(rename = "LEAF", rename_all = "camelCase")]
    Leaf {
        scope: String,
        #[serde(
            default,
            deserialize_with = "some_value",
            skip_serializing_if = "Option::is_none"
        )]
        expected_value: Option<Value>,
    },
    #[serde(rename = "AND")]
    And { conditions: Vec<Condition> },
    #[serde(rename = "OR")]
    Or { conditions: Vec<Condition> },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaCondition {
    scope: String,
    schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fail_when_undefined: Option<bool>,
}

impl From<ConditionRepr> for Condition {
    fn from(repr: ConditionRepr) -> Self {
        match repr {
            ConditionRepr::Tagged(TaggedCondition::Leaf {
                scope,
                expected_value,
            }) => Condition::Leaf {
                scope,
                expected_value,
            },
            ConditionRepr::Tagged(TaggedCondition::And { conditions }) => Condition::And(conditions),
            ConditionRepr::Tagged(TaggedCondition::Or { conditions }) => Condition::Or(conditions),
            ConditionRepr::Schema(c) => Condition::Schema {
                scope: c.scope,
                schema: c.schema,
                fail_when_undefined: c.fail_when_undefined,
            },
        }
    }
}

impl From<Condition> for ConditionRepr {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Leaf {
                scope,
                expected_value,
            } => ConditionRepr::Tagged(TaggedCondition::Leaf {
                scope,
                expected_value,
            }),
            Condition::And(conditions) => ConditionRepr::Tagged(TaggedCondition::And { conditions }),
            Condition::Or(conditions) => ConditionRepr::Tagged(TaggedCondition::Or { conditions }),
            Condition::Schema {
                scope,
                schema,
                fail_when_undefined,
            } => ConditionRepr::Schema(SchemaCondition {
                scope,
                schema,
                fail_when_undefined,
            }),
        }
    }
}

impl Rule {
    /// Show the element while the value at `scope` validates against `schema`.
    pub fn show_when(scope: impl Into<String>, schema: Value) -> Self {
        Rule {
            effect: Effect::Show,
            condition: Condition::Schema {
                scope: scope.into(),
                schema,
                fail_when_undefined: None,
            },
        }
    }
}

impl Condition {
    /// Every scope referenced by this condition, depth first.
    pub fn scopes(&self) -> Vec<&str> {
        match self {
            Condition::Leaf { scope, .. } | Condition::Schema { scope, .. } => vec![scope.as_str()],
            Condition::And(conditions) | Condition::Or(conditions) => {
                conditions.iter().flat_map(Condition::scopes).collect()
            }
        }
    }
}

impl Default for UiSchema {
    /// `{"type": "VerticalLayout", "elements": []}`
    fn default() -> Self {
        UiSchema::VerticalLayout(Layout::default())
    }
}

impl UiSchema {
    /// A control for `scope` with no label.
    pub fn control(scope: impl Into<String>) -> Self {
        UiSchema::Control(Control {
            scope: scope.into(),
            label: None,
            i18n: None,
            rule: None,
            options: None,
        })
    }

    pub fn label(text: impl Into<String>) -> Self {
        UiSchema::Label(LabelElement {
            text: text.into(),
            i18n: None,
            rule: None,
            options: None,
        })
    }

    pub fn vertical(elements: Vec<UiSchema>) -> Self {
        UiSchema::VerticalLayout(Layout {
            elements,
            ..Default::default()
        })
    }

    pub fn horizontal(elements: Vec<UiSchema>) -> Self {
        UiSchema::HorizontalLayout(Layout {
            elements,
            ..Default::default()
        })
    }

    pub fn group(label: impl Into<String>, elements: Vec<UiSchema>) -> Self {
        UiSchema::Group(LabeledLayout {
            elements,
            label: Some(ControlLabel::Text(label.into())),
            ..Default::default()
        })
    }

    /// Attach `rule` to this element.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        let slot = match &mut self {
            UiSchema::VerticalLayout(l) | UiSchema::HorizontalLayout(l) => &mut l.rule,
            UiSchema::Group(l) | UiSchema::Category(l) | UiSchema::Categorization(l) => {
                &mut l.rule
            }
            UiSchema::Control(c) => &mut c.rule,
            UiSchema::Label(l) => &mut l.rule,
        };
        *slot = Some(rule);
        self
    }

    /// The `type` discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            UiSchema::VerticalLayout(_) => "VerticalLayout",
            UiSchema::HorizontalLayout(_) => "HorizontalLayout",
            UiSchema::Group(_) => "Group",
            UiSchema::Category(_) => "Category",
            UiSchema::Categorization(_) => "Categorization",
            UiSchema::Control(_) => "Control",
            UiSchema::Label(_) => "Label",
        }
    }

    /// Child elements of a layout; `None` for controls and labels.
    pub fn elements(&self) -> Option<&[UiSchema]> {
        match self {
            UiSchema::VerticalLayout(l) | UiSchema::HorizontalLayout(l) => Some(&l.elements),
            UiSchema::Group(l) | UiSchema::Category(l) | UiSchema::Categorization(l) => {
                Some(&l.elements)
            }
            UiSchema::Control(_) | UiSchema::Label(_) => None,
        }
    }

    pub fn elements_mut(&mut self) -> Option<&mut Vec<UiSchema>> {
        match self {
            UiSchema::VerticalLayout(l) | UiSchema::HorizontalLayout(l) => Some(&mut l.elements),
            UiSchema::Group(l) | UiSchema::Category(l) | UiSchema::Categorization(l) => {
                Some(&mut l.elements)
            }
            UiSchema::Control(_) | UiSchema::Label(_) => None,
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match self {
            UiSchema::VerticalLayout(l) | UiSchema::HorizontalLayout(l) => l.rule.as_ref(),
            UiSchema::Group(l) | UiSchema::Category(l) | UiSchema::Categorization(l) => {
                l.rule.as_ref()
            }
            UiSchema::Control(c) => c.rule.as_ref(),
            UiSchema::Label(l) => l.rule.as_ref(),
        }
    }

    /// Visit this element and all descendants, parents first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a UiSchema)) {
        f(self);
        for child in self.elements().unwrap_or_default() {
            child.walk(f);
        }
    }

    /// Every scope referenced by controls and rule conditions, in tree order.
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes = Vec::new();
        self.walk(&mut |element| {
            if let UiSchema::Control(control) = element {
                scopes.push(control.scope.as_str());
            }
            if let Some(rule) = element.rule() {
                scopes.extend(rule.condition.scopes());
            }
        });
        scopes
    }

    /// Check the shape rules serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("#")
    }

    fn validate_at(&self, path: &str) -> Result<()> {
        match self {
            UiSchema::Control(control) if !control.scope.starts_with('#') => {
                return Err(FormError::validation(
                    path,
                    format!("control scope `{}` must start with `#`", control.scope),
                ));
            }
            UiSchema::Categorization(layout) => {
                if let Some((i, child)) = layout.elements.iter().enumerate().find(|(_, c)| {
                    !matches!(c, UiSchema::Category(_) | UiSchema::Categorization(_))
                }) {
                    return Err(FormError::validation(
                        format!("{path}/elements/{i}"),
                        format!(
                            "`{}` is not allowed in a Categorization, expected Category",
                            child.kind()
                        ),
                    ));
                }
            }
            _ => {}
        }
        for (i, child) in self.elements().unwrap_or_default().iter().enumerate() {
            child.validate_at(&format!("{path}/elements/{i}"))?;
        }
        Ok(())
    }
}
