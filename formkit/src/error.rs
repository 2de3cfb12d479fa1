//! Error types shared by codecs, converters and synchronized state.
//!
//! Every failure in this crate is local to one parse or conversion attempt.
//! Errors are `Clone + PartialEq` so that state containers can hold the most
//! recent one as observable state instead of re-raising it.

use thiserror::Error;

/// Failure of a text codec, a shape check or a structural conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// The text is not parseable as JSON.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// The text is valid JSON but does not have the expected shape.
    #[error("invalid value at {path}: {message}")]
    Validation { path: String, message: String },

    /// A structural converter met a node it cannot map.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Errors raised by the schema and UI-schema converters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The `type` tag is not one of the recognized schema types.
    #[error("unknown schema type `{tag}` at {path}")]
    UnknownType { path: String, tag: String },

    /// A node that must be typed has no `type` tag.
    #[error("missing schema type at {path}")]
    MissingType { path: String },

    /// Two complete records share the same title.
    #[error("duplicate key `{key}` at {path}")]
    DuplicateKey { path: String, key: String },

    /// `required` names a key that is not a property.
    #[error("required key `{key}` at {path} is not a property")]
    DanglingRequired { path: String, key: String },

    /// A UI-schema scope does not resolve against the data schema.
    #[error("scope `{scope}` does not resolve against the data schema")]
    UnresolvedScope { scope: String },

    /// A `$ref` points outside the document or forms a cycle.
    #[error("cannot resolve reference `{reference}` at {path}")]
    UnresolvedRef { path: String, reference: String },
}

impl FormError {
    /// Build a validation error for `path`.
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        FormError::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify a `serde_json` error raised while reading text.
    ///
    /// Syntax and EOF failures become [`FormError::Syntax`]; data errors
    /// (wrong shape) become [`FormError::Validation`].
    pub fn from_json(err: &serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() || err.is_io() {
            FormError::Syntax {
                line: err.line(),
                column: err.column(),
                message: err.to_string(),
            }
        } else {
            FormError::validation("#", err.to_string())
        }
    }

    /// Whether the text could not be read as JSON at all.
    pub fn is_syntax(&self) -> bool {
        matches!(self, FormError::Syntax { .. })
    }

    /// Whether the JSON was readable but has the wrong shape.
    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation { .. })
    }

    /// Whether a structural converter rejected the value.
    pub fn is_conversion(&self) -> bool {
        matches!(self, FormError::Conversion(_))
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = FormError> = std::result::Result<T, E>;
