//! Value model for data schemas, UI schemas and form data.
//!
//! All types here are plain values: every edit produces a new value, and
//! equality is structural. Map-keyed members compare without regard to key
//! order.
//!
//! - [`data_schema`] - canonical map-keyed schema and its keywords
//! - [`edit_schema`] - list-ordered editing projection
//! - [`ui_schema`] - layout and control tree
//! - [`form_data`] - submitted data
//! - [`bundle`] - stored schema + layout bundle
//! - [`codec`] - the text boundary

/// Canonical data schema.
pub mod data_schema;

/// List-ordered editing projection of the data schema.
pub mod edit_schema;

/// Layout/control tree.
pub mod ui_schema;

/// Submitted form data.
pub mod form_data;

/// Stored design bundle.
pub mod bundle;

/// Text codecs.
pub mod codec;

pub use bundle::FormSchema;
pub use codec::Document;
pub use data_schema::{DataSchema, Format, Keywords, SchemaType};
pub use edit_schema::EditSchema;
pub use form_data::FormData;
pub use ui_schema::{
    Condition, Control, ControlLabel, Effect, LabelDescription, LabelElement, LabeledLayout,
    Layout, Rule, UiSchema,
};
