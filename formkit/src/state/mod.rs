//! Synchronized and buffered state chains.
//!
//! Every editor is a short chain of owned layers over a [`Store`]:
//!
//! ```text
//! BufferedState<SyncedState<&mut Store<DataSchema>, SchemaConverter>>
//! ```
//!
//! Each layer is itself a [`Source`], so layers compose freely. There are no
//! callbacks: an outer layer sees changes made further in by calling
//! [`Source::refresh`], which every layer forwards down the chain before
//! reconciling its own value.

mod buffered;
mod clock;
mod synced;

pub use buffered::BufferedState;
pub use clock::{Clock, ManualClock, SystemClock};
pub use synced::SyncedState;

/// The external side of a state layer.
pub trait Source {
    type Value: Clone + PartialEq;

    /// Current value.
    fn get(&self) -> &Self::Value;

    /// Whether [`put`](Source::put) is honoured. A read-only source accepts
    /// local edits in the layers above it but never receives them.
    fn writable(&self) -> bool {
        true
    }

    /// Replace the value.
    fn put(&mut self, value: Self::Value);

    /// Pull changes made below this layer.
    fn refresh(&mut self) {}
}

impl<S: Source + ?Sized> Source for &mut S {
    type Value = S::Value;

    fn get(&self) -> &S::Value {
        (**self).get()
    }

    fn writable(&self) -> bool {
        (**self).writable()
    }

    fn put(&mut self, value: S::Value) {
        (**self).put(value)
    }

    fn refresh(&mut self) {
        (**self).refresh()
    }
}

/// A plain value cell at the bottom of a chain.
///
/// `revision` counts successful writes through [`Source::put`], which makes
/// it easy to tell how many saves reached the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store<T> {
    value: T,
    writable: bool,
    revision: u64,
}

impl<T> Store<T> {
    pub fn new(value: T) -> Self {
        Store {
            value,
            writable: true,
            revision: 0,
        }
    }

    /// A store that refuses writes from the layers above it.
    pub fn read_only(value: T) -> Self {
        Store {
            writable: false,
            ..Store::new(value)
        }
    }

    /// Change the value from outside the chain, as another editor would.
    ///
    /// Layers above pick the change up on their next refresh.
    pub fn replace(&mut self, value: T) -> T {
        std::mem::replace(&mut self.value, value)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Number of writes received through [`Source::put`].
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Clone + PartialEq> Source for Store<T> {
    type Value = T;

    fn get(&self) -> &T {
        &self.value
    }

    fn writable(&self) -> bool {
        self.writable
    }

    fn put(&mut self, value: T) {
        if !self.writable {
            warn!("ignoring write to a read-only store");
            return;
        }
        self.value = value;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_counts_writes() {
        let mut store = Store::new(1);
        store.put(2);
        store.put(3);
        assert_eq!(*store.get(), 3);
        assert_eq!(store.revision(), 2);

        store.replace(10);
        assert_eq!(store.revision(), 2);
        assert_eq!(store.into_inner(), 10);
    }

    #[test]
    fn test_read_only_store() {
        let mut store = Store::read_only("a".to_string());
        assert!(!store.writable());
        store.put("b".to_string());
        assert_eq!(store.get(), "a");
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_borrowed_source() {
        let mut store = Store::new(vec![1]);
        {
            let mut source = &mut store;
            source.put(vec![1, 2]);
            assert!(source.writable());
        }
        assert_eq!(store.value(), &vec![1, 2]);
    }
}
