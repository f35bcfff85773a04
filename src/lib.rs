//! A virtual file system (VFS) stored as one serialized tree inside a key-value store.
//! Built for embedded scripting hosts that offer nothing but a namespaced JSON-like
//! storage slot: no directories, no files, just `has/get/set` on nested keys.
//!
//! ### Overview
//!
//! `kvfs-kit` keeps folders and files as nested JSON values under a single namespace of
//! a host-supplied [`StorageAdapter`]. Paths are opaque strings built from escaped name
//! tokens, so any name (empty, containing `/`, `.` or `~`) is safe to use.
//!
//! **Key ideas**:
//! - **Injection**: the backing store is passed to the engine; [`MemoryStore`] is the
//!   in-memory reference implementation.
//! - **Lossless names**: [`codec`] escapes reserved characters and always round-trips.
//! - **Consistency**: creations materialize missing ancestor folders, deletions take the
//!   whole subtree, moves refuse to put a folder inside itself.
//! - **Failures as values**: queries return `bool`/`Option`, mutations return
//!   [`VfsError`]; nothing panics on expected failures.
//! - **Change notification**: watchers are called synchronously after each mutation.

mod config;
mod core;
mod store;
mod vfs;

pub use crate::config::VfsOptions;
pub use crate::core::{Result, StorageAdapter, VfsError, codec, path};
pub use crate::store::MemoryStore;
pub use crate::vfs::{KvFS, Node, NodeKind, VfsPath, WatchToken, Watcher};
