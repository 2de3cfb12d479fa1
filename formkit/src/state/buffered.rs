use std::time::Duration;

use super::{Clock, Source};

struct Debounce {
    interval: Duration,
    clock: Box<dyn Clock>,
    deadline: Option<Duration>,
}

/// A draft over a [`Source`] with explicit save and revert.
///
/// While the draft is dirty, changes in the source are not applied to it;
/// [`save`](Self::save) or [`revert`](Self::revert) ends the draft. With a
/// debounce interval every edit (re)schedules a save, which fires from
/// [`poll`](Self::poll) once the interval has passed without further edits.
///
/// On drop a dirty draft is saved when autosave or debounce is enabled.
pub struct BufferedState<S: Source> {
    source: S,
    value: S::Value,
    changed: bool,
    autosave_on_drop: bool,
    debounce: Option<Debounce>,
}

impl<S: Source> BufferedState<S> {
    pub fn new(source: S) -> Self {
        let value = source.get().clone();
        BufferedState {
            source,
            value,
            changed: false,
            autosave_on_drop: true,
            debounce: None,
        }
    }

    pub fn with_autosave(mut self, autosave_on_drop: bool) -> Self {
        self.autosave_on_drop = autosave_on_drop;
        self
    }

    /// Save automatically once `interval` has passed since the last edit.
    pub fn with_debounce(mut self, interval: Duration, clock: impl Clock + 'static) -> Self {
        self.debounce = Some(Debounce {
            interval,
            clock: Box::new(clock),
            deadline: None,
        });
        self
    }

    pub fn value(&self) -> &S::Value {
        &self.value
    }

    /// Whether the draft differs from what was last saved or loaded.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_value(&mut self, value: S::Value) {
        if value == self.value {
            trace!("buffered value unchanged");
            return;
        }
        self.value = value;
        self.changed = true;
        if let Some(debounce) = &mut self.debounce {
            debounce.deadline = Some(debounce.clock.now() + debounce.interval);
        }
    }

    pub fn update(&mut self, f: impl FnOnce(&mut S::Value)) {
        let mut value = self.value.clone();
        f(&mut value);
        self.set_value(value);
    }

    /// Commit the draft. Returns whether anything was written.
    ///
    /// A read-only source keeps the draft dirty.
    pub fn save(&mut self) -> bool {
        if !self.changed {
            return false;
        }
        self.cancel_timer();
        if !self.source.writable() {
            warn!("cannot save draft: source is read-only");
            return false;
        }
        debug!("saving buffered draft");
        self.source.put(self.value.clone());
        self.changed = false;
        self.value = self.source.get().clone();
        true
    }

    /// Drop the draft and reload the source value.
    pub fn revert(&mut self) {
        if !self.changed {
            return;
        }
        debug!("reverting buffered draft");
        self.cancel_timer();
        self.value = self.source.get().clone();
        self.changed = false;
    }

    /// Fire a due debounce save. Returns whether a save happened.
    pub fn poll(&mut self) -> bool {
        let due = self
            .debounce
            .as_ref()
            .and_then(|d| d.deadline.filter(|deadline| d.clock.now() >= *deadline))
            .is_some();
        due && self.save()
    }

    /// When the pending debounce save is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.debounce.as_ref().and_then(|d| d.deadline)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Direct access to the layer below. Changes made through it reach the
    /// draft on the next [`refresh`](Source::refresh), unless it is dirty.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    fn cancel_timer(&mut self) {
        if let Some(debounce) = &mut self.debounce {
            debounce.deadline = None;
        }
    }
}

impl<S: Source> Source for BufferedState<S> {
    type Value = S::Value;

    fn get(&self) -> &S::Value {
        &self.value
    }

    fn put(&mut self, value: S::Value) {
        self.set_value(value);
    }

    fn refresh(&mut self) {
        self.source.refresh();
        if self.changed {
            trace!("draft is dirty, ignoring source change");
            return;
        }
        if self.source.get() != &self.value {
            self.value = self.source.get().clone();
        }
    }
}

impl<S: Source> Drop for BufferedState<S> {
    fn drop(&mut self) {
        if self.changed && (self.autosave_on_drop || self.debounce.is_some()) {
            self.save();
        }
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ManualClock, Store};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_draft_wins_over_source() {
        let mut store = Store::new("A");
        let mut buffered = BufferedState::new(&mut store);

        buffered.set_value("B");
        assert!(buffered.is_changed());

        buffered.source_mut().replace("C");
        buffered.refresh();
        assert_eq!(*buffered.value(), "B");

        buffered.revert();
        assert_eq!(*buffered.value(), "C");
        assert!(!buffered.is_changed());

        buffered.source_mut().replace("D");
        buffered.refresh();
        assert_eq!(*buffered.value(), "D");
    }

    #[test]
    fn test_save_and_revert_are_idempotent() {
        let mut store = Store::new(1);
        {
            let mut buffered = BufferedState::new(&mut store);
            assert!(!buffered.save());
            buffered.revert();
            assert_eq!(buffered.source().revision(), 0);

            buffered.set_value(2);
            assert!(buffered.save());
            assert!(!buffered.save());
            buffered.revert();
            assert_eq!(*buffered.value(), 2);

            // setting the current value is not an edit
            buffered.set_value(2);
            assert!(!buffered.is_changed());
        }
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_debounce_fires_once_after_last_edit() {
        let clock = ManualClock::new();
        let mut store = Store::new(String::new());
        {
            let mut buffered = BufferedState::new(&mut store).with_debounce(ms(1500), clock.clone());

            buffered.set_value("a".into());
            clock.set(ms(500));
            assert!(!buffered.poll());
            buffered.set_value("ab".into());
            clock.set(ms(1000));
            assert!(!buffered.poll());
            buffered.set_value("abc".into());
            assert_eq!(buffered.next_deadline(), Some(ms(2500)));

            clock.set(ms(2499));
            assert!(!buffered.poll());
            assert_eq!(buffered.source().revision(), 0);

            clock.set(ms(2500));
            assert!(buffered.poll());
            assert_eq!(buffered.next_deadline(), None);

            clock.set(ms(10_000));
            assert!(!buffered.poll());
        }
        assert_eq!(store.revision(), 1);
        assert_eq!(store.value(), "abc");
    }

    #[test]
    fn test_revert_cancels_timer() {
        let clock = ManualClock::new();
        let mut store = Store::new(0);
        let mut buffered = BufferedState::new(&mut store).with_debounce(ms(100), clock.clone());
        buffered.set_value(1);
        buffered.revert();
        clock.advance(ms(200));
        assert!(!buffered.poll());
        assert_eq!(buffered.source().revision(), 0);
    }

    #[test]
    fn test_drop_saves_dirty_draft() {
        let mut store = Store::new(0);
        {
            let mut buffered = BufferedState::new(&mut store);
            buffered.set_value(5);
        }
        assert_eq!(*store.value(), 5);
        assert_eq!(store.revision(), 1);

        {
            let mut buffered = BufferedState::new(&mut store).with_autosave(false);
            buffered.set_value(6);
        }
        assert_eq!(*store.value(), 5);

        // debounce alone also saves on drop
        {
            let mut buffered = BufferedState::new(&mut store)
                .with_autosave(false)
                .with_debounce(ms(1500), ManualClock::new());
            buffered.set_value(7);
        }
        assert_eq!(*store.value(), 7);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_read_only_source_stays_dirty() {
        let mut store = Store::read_only(1);
        let mut buffered = BufferedState::new(&mut store);
        buffered.set_value(2);
        assert!(!buffered.save());
        assert!(buffered.is_changed());
        assert_eq!(*buffered.source().value(), 1);
    }
}
