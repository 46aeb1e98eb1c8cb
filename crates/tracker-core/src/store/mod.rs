// ── Central reactive store ──
//
// Single source of truth for loaded server data. One group of slots per
// entity kind (entry under edit, browse list, change log), plus the
// cached current-user record, the user action feed, and the notification
// slot. Mutations never perform I/O; they only assign store-owned state,
// and every commit is a fresh `Arc` snapshot broadcast over `watch`
// channels.

mod slot;

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::model::{Entry, LogRecord, UserInfo};
use crate::notify::{Notification, NotificationSink};
use crate::stream::SlotStream;
use crate::validate;
use tracker_api::Kind;

pub use slot::{Generation, LoadState, SlotValue};
use slot::Slot;

/// The slots backing one entity kind.
struct KindSlots {
    entry: Slot<Entry>,
    list: Slot<Vec<Entry>>,
    log: Slot<Vec<LogRecord>>,
}

impl KindSlots {
    fn new() -> Self {
        Self {
            entry: Slot::new(),
            list: Slot::new(),
            log: Slot::new(),
        }
    }
}

/// Central reactive store for the Data Tracker client.
///
/// Consumers read through the snapshot accessors or subscribe to a
/// [`SlotStream`]; returned values are immutable shared snapshots, so no
/// holder of a previous reference ever observes later changes.
pub struct Store {
    dataset: KindSlots,
    order: KindSlots,
    collection: KindSlots,
    user: KindSlots,
    current_user: Slot<UserInfo>,
    user_actions: Slot<Vec<LogRecord>>,
    notification: watch::Sender<Option<Arc<Notification>>>,
}

impl Store {
    pub fn new() -> Self {
        let (notification, _) = watch::channel(None);
        Self {
            dataset: KindSlots::new(),
            order: KindSlots::new(),
            collection: KindSlots::new(),
            user: KindSlots::new(),
            current_user: Slot::new(),
            user_actions: Slot::new(),
            notification,
        }
    }

    fn slots(&self, kind: Kind) -> &KindSlots {
        match kind {
            Kind::Dataset => &self.dataset,
            Kind::Order => &self.order,
            Kind::Collection => &self.collection,
            Kind::User => &self.user,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// The entry currently loaded (or under edit) for a kind.
    pub fn entry(&self, kind: Kind) -> SlotValue<Entry> {
        self.slots(kind).entry.snapshot()
    }

    /// The browse list for a kind.
    pub fn entry_list(&self, kind: Kind) -> SlotValue<Vec<Entry>> {
        self.slots(kind).list.snapshot()
    }

    /// The change log loaded for a kind.
    pub fn entry_log(&self, kind: Kind) -> SlotValue<Vec<LogRecord>> {
        self.slots(kind).log.snapshot()
    }

    /// The action feed loaded for a user.
    pub fn user_actions(&self) -> SlotValue<Vec<LogRecord>> {
        self.user_actions.snapshot()
    }

    /// The cached authenticated principal.
    pub fn current_user(&self) -> SlotValue<UserInfo> {
        self.current_user.snapshot()
    }

    /// The latest notification, if any.
    pub fn notification(&self) -> Option<Arc<Notification>> {
        self.notification.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_entry(&self, kind: Kind) -> SlotStream<Entry> {
        SlotStream::new(self.slots(kind).entry.subscribe())
    }

    pub fn subscribe_entry_list(&self, kind: Kind) -> SlotStream<Vec<Entry>> {
        SlotStream::new(self.slots(kind).list.subscribe())
    }

    pub fn subscribe_entry_log(&self, kind: Kind) -> SlotStream<Vec<LogRecord>> {
        SlotStream::new(self.slots(kind).log.subscribe())
    }

    pub fn subscribe_current_user(&self) -> SlotStream<UserInfo> {
        SlotStream::new(self.current_user.subscribe())
    }

    pub fn subscribe_notifications(&self) -> watch::Receiver<Option<Arc<Notification>>> {
        self.notification.subscribe()
    }

    // ── Load lifecycle (driven by the session) ───────────────────────

    pub(crate) fn begin_entry_load(&self, kind: Kind) -> Generation {
        self.slots(kind).entry.begin_load()
    }

    pub(crate) fn commit_entry(&self, kind: Kind, generation: Generation, entry: Entry) -> bool {
        self.slots(kind).entry.commit(generation, entry)
    }

    pub(crate) fn fail_entry_load(&self, kind: Kind, generation: Generation) -> bool {
        self.slots(kind).entry.fail_load(generation)
    }

    pub(crate) fn begin_list_load(&self, kind: Kind) -> Generation {
        self.slots(kind).list.begin_load()
    }

    pub(crate) fn commit_list(
        &self,
        kind: Kind,
        generation: Generation,
        entries: Vec<Entry>,
    ) -> bool {
        self.slots(kind).list.commit(generation, entries)
    }

    pub(crate) fn fail_list_load(&self, kind: Kind, generation: Generation) -> bool {
        self.slots(kind).list.fail_load(generation)
    }

    pub(crate) fn begin_log_load(&self, kind: Kind) -> Generation {
        self.slots(kind).log.begin_load()
    }

    pub(crate) fn commit_log(
        &self,
        kind: Kind,
        generation: Generation,
        logs: Vec<LogRecord>,
    ) -> bool {
        self.slots(kind).log.commit(generation, logs)
    }

    pub(crate) fn fail_log_load(&self, kind: Kind, generation: Generation) -> bool {
        self.slots(kind).log.fail_load(generation)
    }

    pub(crate) fn begin_actions_load(&self) -> Generation {
        self.user_actions.begin_load()
    }

    pub(crate) fn commit_actions(&self, generation: Generation, logs: Vec<LogRecord>) -> bool {
        self.user_actions.commit(generation, logs)
    }

    pub(crate) fn fail_actions_load(&self, generation: Generation) -> bool {
        self.user_actions.fail_load(generation)
    }

    pub(crate) fn begin_current_user_load(&self) -> Generation {
        self.current_user.begin_load()
    }

    pub(crate) fn commit_current_user(&self, generation: Generation, info: UserInfo) -> bool {
        self.current_user.commit(generation, info)
    }

    pub(crate) fn fail_current_user_load(&self, generation: Generation) -> bool {
        self.current_user.fail_load(generation)
    }

    // ── Save lifecycle ───────────────────────────────────────────────

    pub(crate) fn begin_entry_save(&self, kind: Kind) {
        self.slots(kind).entry.begin_save();
    }

    pub(crate) fn finish_entry_save(&self, kind: Kind) {
        self.slots(kind).entry.finish_save();
    }

    /// Commit the record echoed by a successful save. Unguarded by the
    /// generation counter: concurrent saves to the same slot race and
    /// the last response to resolve wins (documented contract).
    pub(crate) fn commit_saved_entry(&self, kind: Kind, entry: Entry) {
        self.slots(kind).entry.commit_saved(entry);
    }

    pub(crate) fn fail_entry_save(&self, kind: Kind) {
        self.slots(kind).entry.fail_save();
    }

    // ── Entry editing (named mutations, no I/O) ──────────────────────

    /// Apply a field patch to the entry under edit. Absent keys are
    /// created.
    pub fn set_entry_fields(&self, kind: Kind, patch: &Map<String, Value>) {
        self.slots(kind).entry.patch(|entry| entry.set_fields(patch));
    }

    /// Insert a tag on the entry under edit. The key is validated first
    /// (non-empty, no surrounding whitespace); an invalid key changes
    /// nothing. Inserting an existing tag is a silent no-op.
    pub fn add_entry_tag(&self, kind: Kind, key: &str) -> Result<(), validate::ValidationError> {
        validate::tag_key(key)?;
        self.slots(kind).entry.patch(|entry| {
            entry.add_tag(key);
        });
        Ok(())
    }

    /// Remove a tag from the entry under edit. No-op when absent.
    pub fn remove_entry_tag(&self, kind: Kind, key: &str) {
        self.slots(kind).entry.patch(|entry| {
            entry.remove_tag(key);
        });
    }

    /// Insert a property with an empty value. Validated like tags; an
    /// existing key keeps its value.
    pub fn add_entry_property(
        &self,
        kind: Kind,
        key: &str,
    ) -> Result<(), validate::ValidationError> {
        validate::property_key(key)?;
        self.slots(kind).entry.patch(|entry| {
            entry.add_property(key);
        });
        Ok(())
    }

    /// Set a property value (upsert: a missing key is created).
    pub fn set_entry_property(
        &self,
        kind: Kind,
        key: &str,
        value: &str,
    ) -> Result<(), validate::ValidationError> {
        validate::property_key(key)?;
        self.slots(kind).entry.patch(|entry| {
            entry.set_property(key, value);
        });
        Ok(())
    }

    /// Remove a property. No-op when absent.
    pub fn remove_entry_property(&self, kind: Kind, key: &str) {
        self.slots(kind).entry.patch(|entry| {
            entry.remove_property(key);
        });
    }

    // ── Resets (used on navigation away) ─────────────────────────────

    /// Clear the entry slot to the canonical empty entry and drop any
    /// in-flight fetch for it.
    pub fn reset_entry(&self, kind: Kind) {
        self.slots(kind).entry.reset();
    }

    /// Clear the browse list for a kind.
    pub fn reset_entry_list(&self, kind: Kind) {
        self.slots(kind).list.reset();
    }

    /// Clear the change log for a kind.
    pub fn reset_entry_log(&self, kind: Kind) {
        self.slots(kind).log.reset();
    }

    /// Clear the user action feed.
    pub fn reset_user_actions(&self) {
        self.user_actions.reset();
    }

    /// Drop the cached principal (logout, failed reload).
    pub fn reset_current_user(&self) {
        self.current_user.reset();
    }

    // ── Notifications ────────────────────────────────────────────────

    /// Publish a notification, replacing the previous one.
    pub fn push_notification(&self, notification: Notification) {
        let _ = self.notification.send(Some(Arc::new(notification)));
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for Store {
    fn notify(&self, notification: Notification) {
        self.push_notification(notification);
    }
}
