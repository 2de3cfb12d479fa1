use super::Source;
use crate::{convert::Converter, error::FormError};

/// An internal value kept consistent with an external [`Source`] through a
/// [`Converter`].
///
/// A failed conversion never discards a value: the error is kept as state
/// and both sides hold on to their last good value. Reading a bad external
/// value leaves the internal value as it was; writing an internal value that
/// cannot be converted keeps the edit locally and forwards nothing.
pub struct SyncedState<S, C>
where
    S: Source,
    C: Converter<External = S::Value>,
{
    source: S,
    converter: C,
    internal: C::Internal,
    // external value the internal one was last reconciled with
    seen: S::Value,
    error: Option<FormError>,
}

impl<S, C> SyncedState<S, C>
where
    S: Source,
    C: Converter<External = S::Value>,
{
    /// Convert the current external value, falling back to `default` if
    /// that fails. The failure stays visible through [`error`](Self::error).
    pub fn new(default: C::Internal, source: S, converter: C) -> Self {
        let seen = source.get().clone();
        let (internal, error) = match converter.to_internal(&seen) {
            Ok(internal) => (internal, None),
            Err(e) => {
                warn!("initial conversion failed, using default: {e}");
                (default, Some(e))
            }
        };
        SyncedState {
            source,
            converter,
            internal,
            seen,
            error,
        }
    }

    pub fn value(&self) -> &C::Internal {
        &self.internal
    }

    /// The most recent conversion failure, if the last attempt failed.
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Set the internal value and try to push it outward.
    pub fn set(&mut self, value: C::Internal) {
        self.internal = value;
        if !self.source.writable() {
            trace!("read-only source, keeping edit local");
            return;
        }
        match self.converter.to_external(&self.internal) {
            Ok(external) => {
                self.error = None;
                if &external != self.source.get() {
                    debug!("pushing converted value to source");
                    self.source.put(external);
                }
                self.seen = self.source.get().clone();
            }
            Err(e) => {
                warn!("conversion to external failed: {e}");
                self.error = Some(e);
            }
        }
    }

    /// Apply `f` to a copy of the internal value and [`set`](Self::set) it.
    pub fn update(&mut self, f: impl FnOnce(&mut C::Internal)) {
        let mut value = self.internal.clone();
        f(&mut value);
        self.set(value);
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Direct access to the layer below. Changes made through it are seen on
    /// the next [`refresh`](Source::refresh).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Reconvert the source value even if it has not changed, replacing
    /// the internal value when that succeeds.
    pub fn reload(&mut self) {
        self.seen = self.source.get().clone();
        self.convert_seen();
    }

    fn reconcile(&mut self) {
        if self.source.get() == &self.seen {
            return;
        }
        self.seen = self.source.get().clone();
        self.convert_seen();
    }

    fn convert_seen(&mut self) {
        match self.converter.to_internal(&self.seen) {
            Ok(internal) => {
                self.error = None;
                if internal != self.internal {
                    debug!("external change converted");
                    self.internal = internal;
                } else {
                    trace!("external change converts to the current value");
                }
            }
            Err(e) => {
                warn!("conversion of external change failed: {e}");
                self.error = Some(e);
            }
        }
    }
}

impl<S, C> Source for SyncedState<S, C>
where
    S: Source,
    C: Converter<External = S::Value>,
{
    type Value = C::Internal;

    fn get(&self) -> &C::Internal {
        &self.internal
    }

    fn writable(&self) -> bool {
        true
    }

    fn put(&mut self, value: C::Internal) {
        self.set(value);
    }

    fn refresh(&mut self) {
        self.source.refresh();
        self.reconcile();
    }
}
