//! Structural converters between representations.
//!
//! A [`Converter`] is a pair of pure functions between an external
//! (stored) representation and an internal (editing) one. Converters never
//! catch their own errors; [`SyncedState`](crate::state::SyncedState)
//! captures them as observable state.
//!
//! - [`schema`] - data schema ⇄ edit schema
//! - [`ui`] - UI-schema identity and scope guard
//! - [`scope`] - scope path enumeration and resolution
//! - [`import`] - foreign JSON Schema documents and Rust types
//! - [`text`] - value ⇄ pretty JSON text

use std::marker::PhantomData;

use crate::error::Result;

/// Data schema ⇄ edit schema.
pub mod schema;

/// UI-schema converters.
pub mod ui;

/// Scope path building and resolution.
pub mod scope;

/// Import of foreign JSON Schema documents.
pub mod import;

/// Value ⇄ text.
pub mod text;

pub use import::import_schema;
pub use schema::{SchemaConverter, to_canonical, to_editable};
pub use scope::{build_scopes, resolve_scope, scope_options};
pub use text::TextCodec;
pub use ui::{ScopeGuard, check_scopes};

/// A pair of conversions between an external and an internal value.
pub trait Converter {
    /// Stored representation.
    type External: Clone + PartialEq;
    /// Editing representation.
    type Internal: Clone + PartialEq;

    fn to_internal(&self, external: &Self::External) -> Result<Self::Internal>;

    fn to_external(&self, internal: &Self::Internal) -> Result<Self::External>;
}

/// Converter that passes values through unchanged.
pub struct Identity<T>(PhantomData<fn(T) -> T>);

impl<T> Identity<T> {
    pub fn new() -> Self {
        Identity(PhantomData)
    }
}

impl<T> Default for Identity<T> {
    fn default() -> Self {
        Identity::new()
    }
}

impl<T: Clone + PartialEq> Converter for Identity<T> {
    type External = T;
    type Internal = T;

    fn to_internal(&self, external: &T) -> Result<T> {
        Ok(external.clone())
    }

    fn to_external(&self, internal: &T) -> Result<T> {
        Ok(internal.clone())
    }
}

/// Converter built from two closures.
pub struct FnConverter<T, U, F, G> {
    to_internal: F,
    to_external: G,
    _marker: PhantomData<fn(T) -> U>,
}

impl<T, U, F, G> FnConverter<T, U, F, G>
where
    F: Fn(&T) -> Result<U>,
    G: Fn(&U) -> Result<T>,
{
    pub fn new(to_internal: F, to_external: G) -> Self {
        FnConverter {
            to_internal,
            to_external,
            _marker: PhantomData,
        }
    }
}

impl<T, U, F, G> Converter for FnConverter<T, U, F, G>
where
    T: Clone + PartialEq,
    U: Clone + PartialEq,
    F: Fn(&T) -> Result<U>,
    G: Fn(&U) -> Result<T>,
{
    type External = T;
    type Internal = U;

    fn to_internal(&self, external: &T) -> Result<U> {
        (self.to_internal)(external)
    }

    fn to_external(&self, internal: &U) -> Result<T> {
        (self.to_external)(internal)
    }
}
