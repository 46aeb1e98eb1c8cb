// Wire models for the Data Tracker API
//
// Every entity kind (dataset, order, collection, user) shares one generic
// record shape: a handful of fixed fields plus free-form tag and property
// maps. Fields use `#[serde(default)]` liberally because the structure
// templates omit optional fields, and a `#[serde(flatten)]` catch-all keeps
// backend-only fields intact across an edit round-trip.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel id for an entry that has not been saved yet.
///
/// `save()` dispatches on this: empty id means create (POST), anything
/// else means update (PATCH to the item endpoint).
pub const UNSAVED_ID: &str = "";

/// A generic editable record: one dataset, order, collection, or user.
///
/// Tags are set-like (key presence is the tag); properties map keys to
/// string values. Keys are unique by construction and insertion order
/// carries no meaning. Unknown fields land in `extra` so a record fetched
/// from a newer backend survives a patch-and-save cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    /// Catch-all for fields the template omits (authors, editors, orcid, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// A fresh, unsaved entry (all fields at their empty values).
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the id is the unsaved sentinel.
    pub fn is_new(&self) -> bool {
        self.id == UNSAVED_ID
    }

    // ── Field patching ───────────────────────────────────────────────

    /// Apply a field patch: for each key in `patch`, assign the value.
    ///
    /// Absent keys are created (the backend is dynamically typed and the
    /// structure template may omit optional fields). Known fields only
    /// accept values of their own shape; a mismatched value is dropped
    /// rather than clobbering typed state.
    pub fn set_fields(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            match key.as_str() {
                "id" => {
                    if let Some(s) = value.as_str() {
                        self.id = s.to_owned();
                    }
                }
                "title" => {
                    if let Some(s) = value.as_str() {
                        self.title = s.to_owned();
                    }
                }
                "description" => {
                    if let Some(s) = value.as_str() {
                        self.description = s.to_owned();
                    }
                }
                "tags" => {
                    if let Some(arr) = value.as_array() {
                        self.tags = arr
                            .iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect();
                    }
                }
                "properties" => {
                    if let Some(obj) = value.as_object() {
                        self.properties = obj
                            .iter()
                            .filter_map(|(k, v)| {
                                v.as_str().map(|s| (k.clone(), s.to_owned()))
                            })
                            .collect();
                    }
                }
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
    }

    // ── Tag operations (set-like; key presence is the tag) ───────────

    /// Insert a tag. Idempotent: inserting an existing tag is a no-op and
    /// returns `false`. Duplicate-key prevention in the UI is the caller's
    /// responsibility, not enforced here.
    pub fn add_tag(&mut self, key: &str) -> bool {
        self.tags.insert(key.to_owned())
    }

    /// Remove a tag. No-op when absent.
    pub fn remove_tag(&mut self, key: &str) -> bool {
        self.tags.remove(key)
    }

    // ── Property operations (key → string value) ─────────────────────

    /// Insert a property with an empty value. Idempotent: an existing
    /// key keeps its current value and `false` is returned.
    pub fn add_property(&mut self, key: &str) -> bool {
        if self.properties.contains_key(key) {
            return false;
        }
        self.properties.insert(key.to_owned(), String::new());
        true
    }

    /// Set a property value. Upsert: a missing key is created.
    pub fn set_property(&mut self, key: &str, value: &str) {
        self.properties.insert(key.to_owned(), value.to_owned());
    }

    /// Remove a property. No-op when absent.
    pub fn remove_property(&mut self, key: &str) -> bool {
        self.properties.shift_remove(key).is_some()
    }

    // ── Save payload ─────────────────────────────────────────────────

    /// The JSON body transmitted by `save()`.
    ///
    /// The `id` field is stripped: it is supplied for dispatch routing
    /// only and must never be persisted by value in the body.
    pub fn save_payload(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.remove("id");
        }
        value
    }
}

/// One record from an entity's change log, or from a user's action feed.
///
/// Read-only and append-only on the backend; the client never mutates
/// these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub entry_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn new_entry_is_unsaved() {
        assert!(Entry::new().is_new());
    }

    #[test]
    fn set_fields_creates_absent_key() {
        let mut entry = Entry::new();
        entry.set_fields(&patch(json!({"doi": "10.1000/182"})));
        assert_eq!(entry.extra.get("doi"), Some(&json!("10.1000/182")));
    }

    #[test]
    fn set_fields_overwrite_is_last_write_wins() {
        let mut entry = Entry::new();
        entry.set_fields(&patch(json!({"title": "first"})));
        entry.set_fields(&patch(json!({"title": "second"})));
        assert_eq!(entry.title, "second");
    }

    #[test]
    fn set_fields_ignores_mismatched_shape() {
        let mut entry = Entry::new();
        entry.title = "kept".into();
        entry.set_fields(&patch(json!({"title": 42})));
        assert_eq!(entry.title, "kept");
    }

    #[test]
    fn add_then_remove_tag_restores_prior_key_set() {
        let mut entry = Entry::new();
        entry.add_tag("existing");
        let before = entry.tags.clone();

        assert!(entry.add_tag("added"));
        assert!(entry.remove_tag("added"));
        assert_eq!(entry.tags, before);
    }

    #[test]
    fn add_tag_is_idempotent() {
        let mut entry = Entry::new();
        assert!(entry.add_tag("only"));
        assert!(!entry.add_tag("only"));
        assert_eq!(entry.tags.len(), 1);
    }

    #[test]
    fn add_property_keeps_existing_value() {
        let mut entry = Entry::new();
        entry.set_property("depth", "12");
        assert!(!entry.add_property("depth"));
        assert_eq!(entry.properties.get("depth").map(String::as_str), Some("12"));
    }

    #[test]
    fn set_property_upserts_missing_key() {
        let mut entry = Entry::new();
        entry.set_property("station", "north");
        assert_eq!(
            entry.properties.get("station").map(String::as_str),
            Some("north")
        );

        entry.set_property("station", "south");
        assert_eq!(
            entry.properties.get("station").map(String::as_str),
            Some("south")
        );
    }

    #[test]
    fn remove_property_is_noop_when_absent() {
        let mut entry = Entry::new();
        assert!(!entry.remove_property("ghost"));
    }

    #[test]
    fn save_payload_never_contains_id() {
        let mut entry = Entry::new();
        entry.id = "d-1234".into();
        entry.title = "Sequencing run".into();

        let payload = entry.save_payload();
        assert!(payload.get("id").is_none());
        assert_eq!(payload.get("title"), Some(&json!("Sequencing run")));
    }

    #[test]
    fn extra_fields_round_trip() {
        let raw = json!({
            "id": "o-42",
            "title": "Order",
            "description": "",
            "tags": ["confidential"],
            "properties": {"site": "lab-3"},
            "editors": ["u-7"],
        });
        let entry: Entry = serde_json::from_value(raw).unwrap();
        assert_eq!(entry.extra.get("editors"), Some(&json!(["u-7"])));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back.get("editors"), Some(&json!(["u-7"])));
        assert_eq!(back.get("tags"), Some(&json!(["confidential"])));
    }
}
