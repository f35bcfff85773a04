//! This module provides a storage adapter that keeps the whole tree in memory
//! as a single JSON document.

use anyhow::anyhow;
use serde_json::{Map, Value};

use crate::core::codec::KEY_SEPARATOR;
use crate::core::{Result, StorageAdapter};

/// A [`StorageAdapter`] backed by one in-memory `serde_json::Value` tree.
///
/// Keys are `.`-joined field names walked from the document root; the empty key
/// addresses the document itself. Setting a key creates missing intermediate
/// objects, removing a key drops its whole subtree.
///
/// The document can be persisted as a single JSON string with [`MemoryStore::to_json`]
/// and restored with [`MemoryStore::from_json`], which is how hosts with a single
/// storage slot keep the file system between sessions.
///
/// ### Example
///
/// ```
/// use kvfs_kit::{MemoryStore, StorageAdapter};
/// use serde_json::json;
///
/// let mut store = MemoryStore::new();
/// store.set("app.settings.theme", Some(json!("dark"))).unwrap();
/// assert!(store.has("app.settings"));
/// assert_eq!(store.get("app.settings.theme"), Some(json!("dark")));
///
/// store.set("app.settings", None).unwrap();
/// assert!(!store.has("app.settings.theme"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    root: Value,
}

impl MemoryStore {
    /// Creates an empty store (an empty JSON object).
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wraps an existing document.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Restores a store from its JSON serialization.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }

    /// Serializes the whole document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    fn fields(key: &str) -> impl Iterator<Item = &str> {
        key.split(KEY_SEPARATOR).filter(move |_| !key.is_empty())
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for field in Self::fields(key) {
            current = current.as_object()?.get(field)?;
        }
        Some(current)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAdapter for MemoryStore {
    fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.lookup(key).cloned()
    }

    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        let Some((parent_key, last)) = split_last(key) else {
            self.root = value.unwrap_or_else(|| Value::Object(Map::new()));
            return Ok(());
        };

        match value {
            Some(value) => {
                let mut current = &mut self.root;
                for field in Self::fields(parent_key) {
                    let object = current
                        .as_object_mut()
                        .ok_or_else(|| anyhow!("cannot set {key}: {field} has a non-object parent"))?;
                    current = object
                        .entry(field)
                        .or_insert_with(|| Value::Object(Map::new()));
                }
                let object = current
                    .as_object_mut()
                    .ok_or_else(|| anyhow!("cannot set {key}: parent is not an object"))?;
                object.insert(last.to_string(), value);
            }
            None => {
                let mut current = &mut self.root;
                for field in Self::fields(parent_key) {
                    match current.as_object_mut().and_then(|o| o.get_mut(field)) {
                        Some(next) => current = next,
                        None => return Ok(()), // nothing to remove
                    }
                }
                if let Some(object) = current.as_object_mut() {
                    object.remove(last);
                }
            }
        }
        Ok(())
    }
}

/// Splits `a.b.c` into (`a.b`, `c`); `None` for the empty key.
fn split_last(key: &str) -> Option<(&str, &str)> {
    if key.is_empty() {
        return None;
    }
    Some(match key.rfind(KEY_SEPARATOR) {
        Some(idx) => (&key[..idx], &key[idx + 1..]),
        None => ("", key),
    })
}
