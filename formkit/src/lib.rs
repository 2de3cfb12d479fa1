//! # formkit
//!
//! Editing core for JSON-Schema driven form designers.
//!
//! A form design is three values: a [`DataSchema`] describing the data, a
//! [`UiSchema`] laying out controls for it, and sample [`FormData`]. formkit
//! provides the typed value model for all three, the converters between the
//! stored representations and the shapes list-based editors need, and the
//! state layers that keep an editor's draft consistent with the stored value.
//!
//! ## Features
//!
//! - Lossless map ⇄ list conversion of data schemas, `required` flags included
//! - Raw-JSON editing with separate syntax and validation errors
//! - Synchronized state that keeps the last good value on conversion failure
//! - Buffered drafts with save, revert, debounced autosave and save-on-drop
//! - Scope enumeration and resolution for layout controls
//! - Import of foreign JSON Schema documents and of Rust types via `schemars`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formkit::{Designer, meta::sample_form};
//!
//! let mut designer = Designer::new(sample_form());
//! {
//!     let mut editor = designer.schema_gui();
//!     editor.update(|schema| {
//!         schema.properties.get_or_insert_with(Vec::new).push(
//!             formkit::EditSchema::record("notes", formkit::SchemaType::String),
//!         );
//!     });
//! } // dropping the editor saves the draft
//!
//! let (schema, _uischema, _data) = designer.triple();
//! assert!(schema.property("notes").is_some());
//! ```
//!
//! ## Modules
//!
//! - [`model`] - value types and text codecs
//! - [`convert`] - structural converters and scope paths
//! - [`state`] - synchronized and buffered state layers
//! - [`editor`] - designer sessions
//! - [`meta`] - schemas for the structured editors
//! - [`config`] - editor options and file loading

#[macro_use]
extern crate log;

/// Editor options and file loading.
pub mod config;

/// Structural converters.
pub mod convert;

/// Designer sessions composing stores, converters and state layers.
pub mod editor;

/// Error types.
pub mod error;

/// Schemas for the structured editors.
pub mod meta;

/// Value model.
pub mod model;

/// Synchronized and buffered state.
pub mod state;

/// JSON helpers.
pub mod utils;

pub use config::EditorOptions;
pub use convert::{Converter, build_scopes, scope_options, to_canonical, to_editable};
pub use editor::{Designer, JsonEditor};
pub use error::{ConversionError, FormError, Result};
pub use model::{DataSchema, Document, EditSchema, FormData, FormSchema, SchemaType, UiSchema};
pub use state::{BufferedState, Source, Store, SyncedState};
