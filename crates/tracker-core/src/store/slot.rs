// ── Generic store slot ──
//
// One slot holds one unit of server data (the entry under edit, a browse
// list, an audit log). Commits are copy-on-write `Arc` snapshots pushed
// through a `watch` channel, and a generation counter drops responses
// that resolve after the slot has moved on (navigation away, newer load).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::trace;

/// Load state of a store slot.
///
/// The entry lifecycle: `Empty → Loading → Loaded → Saving →
/// {Loaded | Error}`. A failed load clears back to `Empty` (the
/// "loading failed ⇒ empty" contract); a failed save keeps the
/// in-memory value untouched so the user can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Loaded,
    Saving,
    /// A save was rejected. The value is unchanged; retry is manual.
    Error,
}

/// Point-in-time contents of a slot: the state plus a shared snapshot.
///
/// The snapshot is immutable. Later mutations produce a fresh `Arc`, so
/// holders of an earlier snapshot never observe changes through it.
#[derive(Debug, Clone)]
pub struct SlotValue<T> {
    pub state: LoadState,
    pub value: Arc<T>,
}

/// Token tying an in-flight load to the slot generation it started from.
///
/// A commit or failure carrying a stale token is dropped: the slot was
/// reset or a newer load superseded the request while it was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

pub(crate) struct Slot<T> {
    tx: watch::Sender<SlotValue<T>>,
    generation: AtomicU64,
}

impl<T: Default + Clone + Send + Sync + 'static> Slot<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(SlotValue {
            state: LoadState::Empty,
            value: Arc::new(T::default()),
        });
        Self {
            tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Start a load: bump the generation and mark the slot `Loading`.
    ///
    /// The current value is kept while the fetch is in flight; callers
    /// that must never show stale data reset the slot first.
    pub(crate) fn begin_load(&self) -> Generation {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|slot| slot.state = LoadState::Loading);
        Generation(generation)
    }

    /// Commit a loaded value. Returns `false` (and changes nothing) when
    /// the token is stale.
    pub(crate) fn commit(&self, generation: Generation, value: T) -> bool {
        if !self.is_current(generation) {
            trace!("dropping stale commit");
            return false;
        }
        self.tx.send_modify(|slot| {
            slot.state = LoadState::Loaded;
            slot.value = Arc::new(value);
        });
        true
    }

    /// Record a failed load: clear the slot back to its empty value.
    /// Stale failures are dropped like stale commits.
    pub(crate) fn fail_load(&self, generation: Generation) -> bool {
        if !self.is_current(generation) {
            trace!("dropping stale load failure");
            return false;
        }
        self.tx.send_modify(|slot| {
            slot.state = LoadState::Empty;
            slot.value = Arc::new(T::default());
        });
        true
    }

    /// Mark the slot `Saving`. The value is left untouched.
    pub(crate) fn begin_save(&self) {
        self.tx.send_modify(|slot| slot.state = LoadState::Saving);
    }

    /// A save finished without the server echoing the record back.
    pub(crate) fn finish_save(&self) {
        self.tx.send_modify(|slot| slot.state = LoadState::Loaded);
    }

    /// Commit the record echoed by a successful save.
    ///
    /// Deliberately unguarded by the generation counter: concurrent saves
    /// to the same slot race, and the last response to resolve wins.
    pub(crate) fn commit_saved(&self, value: T) {
        self.tx.send_modify(|slot| {
            slot.state = LoadState::Loaded;
            slot.value = Arc::new(value);
        });
    }

    /// A save was rejected: surface the error state, keep the value
    /// (nothing was optimistically mutated, so there is no rollback).
    pub(crate) fn fail_save(&self) {
        self.tx.send_modify(|slot| slot.state = LoadState::Error);
    }

    /// Apply an in-place edit through copy-on-write: the current value
    /// is cloned, mutated, and stored as a fresh snapshot.
    pub(crate) fn patch(&self, edit: impl FnOnce(&mut T)) {
        self.tx.send_modify(|slot| {
            let mut value = (*slot.value).clone();
            edit(&mut value);
            slot.value = Arc::new(value);
        });
    }

    /// Clear the slot to its canonical empty value and invalidate every
    /// in-flight load against it.
    pub(crate) fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_modify(|slot| {
            slot.state = LoadState::Empty;
            slot.value = Arc::new(T::default());
        });
    }

    pub(crate) fn snapshot(&self) -> SlotValue<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SlotValue<T>> {
        self.tx.subscribe()
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.generation.load(Ordering::SeqCst) == generation.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn commit_with_current_generation_lands() {
        let slot: Slot<String> = Slot::new();
        let generation = slot.begin_load();

        assert!(slot.commit(generation, "hello".into()));

        let snap = slot.snapshot();
        assert_eq!(snap.state, LoadState::Loaded);
        assert_eq!(*snap.value, "hello");
    }

    #[test]
    fn stale_commit_is_dropped() {
        let slot: Slot<String> = Slot::new();
        let stale = slot.begin_load();
        let fresh = slot.begin_load();

        assert!(!slot.commit(stale, "old".into()));
        assert!(slot.commit(fresh, "new".into()));
        assert_eq!(*slot.snapshot().value, "new");
    }

    #[test]
    fn reset_invalidates_in_flight_load() {
        let slot: Slot<String> = Slot::new();
        let generation = slot.begin_load();

        slot.reset();

        assert!(!slot.commit(generation, "late".into()));
        let snap = slot.snapshot();
        assert_eq!(snap.state, LoadState::Empty);
        assert_eq!(*snap.value, String::new());
    }

    #[test]
    fn failed_load_clears_previous_value() {
        let slot: Slot<String> = Slot::new();
        let first = slot.begin_load();
        slot.commit(first, "previous".into());

        let second = slot.begin_load();
        assert!(slot.fail_load(second));

        let snap = slot.snapshot();
        assert_eq!(snap.state, LoadState::Empty);
        assert_eq!(*snap.value, String::new());
    }

    #[test]
    fn failed_save_keeps_value() {
        let slot: Slot<String> = Slot::new();
        let generation = slot.begin_load();
        slot.commit(generation, "draft".into());

        slot.begin_save();
        slot.fail_save();

        let snap = slot.snapshot();
        assert_eq!(snap.state, LoadState::Error);
        assert_eq!(*snap.value, "draft");
    }

    #[test]
    fn patch_is_copy_on_write() {
        let slot: Slot<Vec<u32>> = Slot::new();
        let generation = slot.begin_load();
        slot.commit(generation, vec![1]);

        let before = slot.snapshot().value;
        slot.patch(|v| v.push(2));

        // The earlier snapshot must not observe the edit.
        assert_eq!(*before, vec![1]);
        assert_eq!(*slot.snapshot().value, vec![1, 2]);
    }

    #[test]
    fn subscribers_see_commits() {
        let slot: Slot<String> = Slot::new();
        let rx = slot.subscribe();

        let generation = slot.begin_load();
        slot.commit(generation, "pushed".into());

        assert_eq!(*rx.borrow().value, "pushed");
    }
}
