pub mod codec;
mod error;
pub mod path;

use serde_json::Value;

pub use error::VfsError;

/// Namespaced key-value store holding the serialized tree.
///
/// Keys are `.`-joined segments addressing a position in a nested JSON-like
/// document (`"vfs.children.a~dtxt.content"`). The store is supplied by the host;
/// the engine never assumes anything about where it persists its data.
pub trait StorageAdapter {
    /// Checks whether a value is present under `key`.
    fn has(&self, key: &str) -> bool;

    /// Returns an owned copy of the value under `key` (with its whole subtree).
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`. `None` removes the key together with its subtree.
    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()>;
}

impl<S: StorageAdapter + ?Sized> StorageAdapter for Box<S> {
    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        (**self).set(key, value)
    }
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;
