//! Merge-safe persistence against the remote document store.
//!
//! Documents are keyed by the principal's lower-cased display name. Loading
//! overlays the remote document onto a fresh default record (remote wins per
//! top-level field). Saving is a merge-write: fetch remote, union the
//! `timeBox` maps with local winning per overlapping date, overlay local
//! top-level fields, write back. Two sessions editing disjoint dates never
//! clobber each other.
//!
//! Known limitation, kept deliberately: the fetch-then-write window is
//! unprotected. Two concurrent writers editing the *same* date race and the
//! last write wins. No version token, no lock.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::PlannerError;
use crate::types::UserRecord;

/// Key-value document interface of the remote store. No transactions, no
/// range queries; `upsert` creates the document when absent.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, PlannerError>;
    async fn upsert(&self, key: &str, document: Value) -> Result<(), PlannerError>;
}

/// Normalize a display name into a document key.
pub fn document_key(display_name: &str) -> String {
    display_name.to_lowercase()
}

/// Load the principal's record: fetch the remote document and overlay it onto
/// `defaults`. A missing document yields the defaults unchanged; a read error
/// degrades to the defaults with a warning (remote history is masked until
/// the next successful fetch).
pub async fn load_user<S: DocumentStore>(store: &S, defaults: UserRecord) -> UserRecord {
    let key = document_key(&defaults.display_name);
    match store.get(&key).await {
        Ok(Some(remote)) => overlay_remote(defaults, remote),
        Ok(None) => defaults,
        Err(err) => {
            log::warn!("load of document {key:?} failed: {err}; using in-memory defaults");
            defaults
        }
    }
}

/// Overlay a remote document onto a default record, remote winning per
/// top-level field. Hour fields that are not numeric backfill to the fixed
/// fallbacks; a missing `timeBox` becomes an empty map (both via the serde
/// defaults on [`UserRecord`]).
fn overlay_remote(defaults: UserRecord, remote: Value) -> UserRecord {
    let mut base = match serde_json::to_value(&defaults) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Value::Object(remote_map) = remote {
        for (field, value) in remote_map {
            base.insert(field, value);
        }
    }
    match serde_json::from_value(Value::Object(base)) {
        Ok(user) => user,
        Err(err) => {
            log::warn!("remote document did not deserialize: {err}; using in-memory defaults");
            defaults
        }
    }
}

/// Merge-write the principal's record back to the store.
///
/// 1. Fetch the current remote document.
/// 2. Merged `timeBox` = union of remote and local date maps; a date present
///    in both takes the local record wholesale (no per-field merge).
/// 3. Final document = remote top-level fields overlaid with local ones,
///    `timeBox` replaced by the merged map.
/// 4. Upsert, creating the document if absent.
///
/// A failed remote fetch aborts the write: a merge computed against unknown
/// remote state could drop dates, so local state stays authoritative and the
/// error is surfaced instead.
pub async fn save_user<S: DocumentStore>(store: &S, user: &UserRecord) -> Result<(), PlannerError> {
    let key = document_key(&user.display_name);
    let remote = store.get(&key).await?;

    let mut remote_doc = match remote {
        Some(Value::Object(map)) => map,
        Some(other) => {
            log::warn!("remote document {key:?} is not an object ({other:?}); replacing");
            Map::new()
        }
        None => Map::new(),
    };

    let mut merged_time_box = match remote_doc.get("timeBox") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    for (date, record) in &user.time_box {
        merged_time_box.insert(date.clone(), serde_json::to_value(record)?);
    }

    let local = match serde_json::to_value(user)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (field, value) in local {
        remote_doc.insert(field, value);
    }
    remote_doc.insert("timeBox".to_string(), Value::Object(merged_time_box));

    store.upsert(&key, Value::Object(remote_doc)).await
}

/// In-memory document store. Reference implementation of the shallow-merge
/// upsert contract; also the store used throughout the tests.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document snapshot, for assertions.
    pub fn document(&self, key: &str) -> Option<Value> {
        self.documents.lock().get(key).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PlannerError> {
        Ok(self.documents.lock().get(key).cloned())
    }

    async fn upsert(&self, key: &str, document: Value) -> Result<(), PlannerError> {
        let mut documents = self.documents.lock();
        match (documents.remove(key), document) {
            // Shallow merge: incoming top-level fields replace existing ones.
            (Some(Value::Object(mut existing)), Value::Object(incoming)) => {
                for (field, value) in incoming {
                    existing.insert(field, value);
                }
                documents.insert(key.to_string(), Value::Object(existing));
            }
            (_, document) => {
                documents.insert(key.to_string(), document);
            }
        }
        Ok(())
    }
}
