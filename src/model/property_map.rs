//! PropertyMap — the insertion-ordered key→value payload.
//!
//! Used both as the grouped-value payload of a `ReferenceGroup` and as the
//! generic property bag passed across the persistence boundary. Insertion
//! order is contractual: it is the serialization order.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::key::PropertyKey;
use super::Value;

/// An ordered mapping from `PropertyKey` to `Value`.
///
/// Key identity is the key's storage name (`db_name`); inserting under an
/// already-present key replaces the value in place, preserving the original
/// position. Serializes as an ordered JSON object of `json_name -> value`.
#[derive(Clone, Default)]
pub struct PropertyMap {
    entries: Vec<(Arc<dyn PropertyKey>, Value)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the value for a key. Replacement keeps the entry's
    /// original position.
    pub fn put(&mut self, key: Arc<dyn PropertyKey>, value: Value) {
        for (existing, slot) in &mut self.entries {
            if existing.db_name() == key.db_name() {
                *slot = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &dyn PropertyKey) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.db_name() == key.db_name())
            .map(|(_, v)| v)
    }

    /// Lookup by the external (JSON) name of the key.
    pub fn get_by_json_name(&self, json_name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.json_name() == json_name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, key: &dyn PropertyKey) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &dyn PropertyKey) -> Option<Value> {
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| k.db_name() == key.db_name())?;
        Some(self.entries.remove(pos).1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<dyn PropertyKey>, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Arc<dyn PropertyKey>> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl FromIterator<(Arc<dyn PropertyKey>, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (Arc<dyn PropertyKey>, Value)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.put(k, v);
        }
        map
    }
}

/// Equality is per-entry: same storage names, same values, same order.
impl PartialEq for PropertyMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka.db_name() == kb.db_name() && va == vb)
    }
}

impl fmt::Debug for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_map();
        for (key, value) in &self.entries {
            dbg.entry(&key.json_name(), value);
        }
        dbg.finish()
    }
}

/// Ordered object of `json_name -> value` — the wire shape consumed by the
/// serialization layer.
impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.json_name(), value)?;
        }
        map.end()
    }
}
