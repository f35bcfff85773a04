//! This module provides the file system engine that keeps its tree inside a
//! [`StorageAdapter`].

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::config::VfsOptions;
use crate::core::{StorageAdapter, VfsError, path};
use crate::vfs::watch::{WatchToken, Watchers};
use crate::vfs::{Node, NodeKind};

type VfsResult<T> = std::result::Result<T, VfsError>;

/// A virtual file system whose whole tree is one nested value inside a key-value store.
///
/// `KvFS` addresses nodes by opaque paths built with [`crate::path`]: the root is `""`,
/// `/a/b` is the child `b` of the folder `a`. Every path maps to a store key
/// (`<namespace>.children.a.children.b`); a node there is a folder when it holds a
/// `children` map and a file when it holds `content`.
///
/// ### Internal state
///
/// * `store`: the injected [`StorageAdapter`]. The engine only talks to it through
///   `has/get/set` and never caches what it reads.
/// * `options`: namespace and display delimiter, see [`VfsOptions`].
/// * `watchers`: callbacks fired after every successful mutation.
///
/// ### Invariants
///
/// 1. **Root existence**: the root denotes a folder unless the namespace key holds
///    something else (a scalar, or a map with `content`). An absent namespace key, or
///    a map with neither `children` nor `content`, reads as an empty folder; `root()`
///    and every create/copy materialize it by writing its `children` map only.
/// 2. **Parent consistency**: for any node at `/a/b/c` there is a folder at `/a/b`.
///    Missing ancestors are created as folders, never as files, in the same store
///    write as the node itself.
/// 3. **No type change in place**: a path turns from folder to file (or back) only
///    through `delete` followed by a create.
/// 4. **Acyclicity**: a folder is never moved into its own subtree.
///
/// ### Failure reporting
///
/// Queries answer with `bool`/`Option`. Mutations return [`VfsError`] and leave the
/// store untouched on failure, with one exception: `move_to` is `copy` then
/// `delete`, and when the delete fails the copy is kept, so both nodes exist.
///
/// ### Reentrancy
///
/// Methods take `&self`. The store and the watcher registry are borrowed only for
/// the duration of single reads/writes, never while a watcher runs, so a watcher
/// holding an `Rc`/`Weak` to the engine may mutate it. Such nested mutations
/// interleave with whatever the outer call still has to do (a `move_to` watcher
/// sees the destination before the source is deleted).
///
/// ### Thread Safety
///
/// `KvFS` is single-threaded (`!Sync`).
///
/// ### Example
///
/// ```
/// use kvfs_kit::{KvFS, MemoryStore, path};
/// use serde_json::json;
///
/// let fs = KvFS::new(MemoryStore::new());
/// let note = path::from_names(["docs", "note.txt"]);
///
/// fs.create_file(&note, json!("Hello")).unwrap();
/// assert!(fs.is_folder(&path::from_names(["docs"])));
/// assert_eq!(fs.data(&note), Some(json!("Hello")));
///
/// fs.delete(&note).unwrap();
/// assert!(!fs.exists(&note));
/// ```
pub struct KvFS<S, T = Value> {
    store: RefCell<S>,
    options: VfsOptions,
    watchers: RefCell<Watchers>,
    content: PhantomData<fn() -> T>,
}

impl<S: StorageAdapter> KvFS<S, Value> {
    /// Creates an engine over `store` with default options and untyped JSON content.
    pub fn new(store: S) -> Self {
        Self::open(store, VfsOptions::default())
    }

    /// Creates an engine over `store` with untyped JSON content.
    pub fn with_options(store: S, options: VfsOptions) -> Self {
        Self::open(store, options)
    }
}

impl<S, T> KvFS<S, T>
where
    S: StorageAdapter,
    T: Serialize + DeserializeOwned,
{
    /// Creates an engine over `store` whose files hold `T`.
    /// Nothing is written until the first mutation (or `root()`).
    pub fn open(store: S, options: VfsOptions) -> Self {
        Self {
            store: RefCell::new(store),
            options,
            watchers: RefCell::new(Watchers::default()),
            content: PhantomData,
        }
    }

    pub fn options(&self) -> &VfsOptions {
        &self.options
    }

    /// Runs `f` with read access to the backing store.
    pub fn with_store<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.store.borrow())
    }

    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    /// Makes sure the root folder is stored and returns the root path.
    pub fn root(&self) -> VfsResult<String> {
        match self.root_slot() {
            RootSlot::Folder => {}
            RootSlot::Vacant { stored } => self.write_root_children(stored, Map::new())?,
            RootSlot::Occupied => return Err(not_a_folder(path::ROOT)),
        }
        Ok(path::ROOT.to_string())
    }

    /// Checks if a node exists at `path`.
    ///
    /// The root exists unless the namespace key holds a value that is not a folder.
    pub fn exists(&self, path: &str) -> bool {
        if !path::is_valid(path) {
            return false;
        }
        if path::is_root(path) {
            return self.kind(path).is_some();
        }
        self.store.borrow().has(&self.key(path))
    }

    pub fn kind(&self, path: &str) -> Option<NodeKind> {
        if !path::is_valid(path) {
            return None;
        }
        if path::is_root(path) {
            return match self.root_slot() {
                RootSlot::Occupied => None,
                RootSlot::Folder | RootSlot::Vacant { .. } => Some(NodeKind::Folder),
            };
        }
        self.stored_kind(path)
    }

    pub fn is_folder(&self, path: &str) -> bool {
        self.kind(path) == Some(NodeKind::Folder)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.kind(path) == Some(NodeKind::File)
    }

    /// Returns the paths of the immediate children of the folder at `path`,
    /// or `None` if `path` is not a folder. Order is not significant.
    pub fn children(&self, path: &str) -> Option<Vec<String>> {
        if self.kind(path)? != NodeKind::Folder {
            return None;
        }
        let children = self
            .store
            .borrow()
            .get(&path::children_key(&self.key(path)));
        match children {
            Some(Value::Object(map)) => Some(map.keys().map(|token| path::join(path, token)).collect()),
            Some(_) => None,
            None => Some(Vec::new()), // root not stored yet
        }
    }

    /// Returns every path below the folder at `path`, depth first, parents before
    /// their children. `None` if `path` is not a folder.
    pub fn tree(&self, path: &str) -> Option<Vec<String>> {
        if self.kind(path)? != NodeKind::Folder {
            return None;
        }
        let mut found = Vec::new();
        if let Some(subtree) = self.subtree(path) {
            collect_descendants(path, &subtree, &mut found);
        }
        Some(found)
    }

    /// Returns an owned copy of the content of the file at `path`.
    ///
    /// `None` if `path` is not a file, or if the stored content does not deserialize
    /// into `T`.
    pub fn data(&self, path: &str) -> Option<T> {
        if self.kind(path)? != NodeKind::File {
            return None;
        }
        let value = self
            .store
            .borrow()
            .get(&path::content_key(&self.key(path)))?;
        serde_json::from_value(value)
            .inspect_err(|err| warn!(path, error = %err, "stored content does not match the content type"))
            .ok()
    }

    /// Returns a typed deep copy of the subtree rooted at `path`.
    pub fn snapshot(&self, path: &str) -> Option<Node<T>> {
        let subtree = self.subtree(path)?;
        serde_json::from_value(subtree)
            .inspect_err(|err| warn!(path, error = %err, "stored subtree is not a valid node"))
            .ok()
    }

    /// Renders `path` as decoded names joined by `delimiter`, folders suffixed with it.
    pub fn format_path(&self, path: &str, delimiter: &str) -> String {
        path::format(&path::names(path), delimiter, self.is_folder(path))
    }

    /// [`KvFS::format_path`] with the configured display delimiter.
    pub fn display_path(&self, path: &str) -> String {
        self.format_path(path, &self.options.display_delimiter)
    }

    /// Creates an empty folder at `path`, creating missing ancestor folders first.
    pub fn create_folder(&self, path: &str) -> VfsResult<()> {
        self.create(path, Node::folder())
            .inspect_err(|err| rejected("create_folder", path, err))
    }

    /// Creates a file holding `content` at `path`, creating missing ancestor folders first.
    pub fn create_file(&self, path: &str, content: T) -> VfsResult<()> {
        self.create(path, Node::file(content))
            .inspect_err(|err| rejected("create_file", path, err))
    }

    /// Removes the node at `path`; folders go with their whole subtree.
    ///
    /// Watchers are notified once, for `path` only.
    pub fn delete(&self, path: &str) -> VfsResult<()> {
        self.try_delete(path)
            .inspect_err(|err| rejected("delete", path, err))
    }

    /// Deep-copies the subtree at `src` to the free path `dst`.
    pub fn copy(&self, src: &str, dst: &str) -> VfsResult<()> {
        self.try_copy(src, dst)
            .inspect_err(|err| rejected("copy", src, err))
    }

    /// Moves the node at `src` to the free path `dst` (a `copy` followed by a `delete`).
    ///
    /// Moving a folder into itself or below itself fails with
    /// [`VfsError::CycleRejected`]. If the copy succeeds but the delete fails, the
    /// copy is not rolled back: both `src` and `dst` exist and the delete's error is
    /// returned.
    pub fn move_to(&self, src: &str, dst: &str) -> VfsResult<()> {
        self.try_move(src, dst)
            .inspect_err(|err| rejected("move", src, err))
    }

    /// Renames the node at `path` within its folder and returns its new path.
    pub fn rename(&self, path: &str, name: &str) -> VfsResult<String> {
        self.try_rename(path, name)
            .inspect_err(|err| rejected("rename", path, err))
    }

    /// Replaces the content of the file at `path`.
    pub fn set_data(&self, path: &str, content: T) -> VfsResult<()> {
        self.try_set_data(path, content)
            .inspect_err(|err| rejected("set_data", path, err))
    }

    /// Removes every node below the root, keeping the root folder itself.
    pub fn clear(&self) -> VfsResult<()> {
        let stored = match self.root_slot() {
            RootSlot::Folder => true,
            RootSlot::Vacant { stored } => stored,
            RootSlot::Occupied => return Err(not_a_folder(path::ROOT)),
        };
        self.write_root_children(stored, Map::new())?;
        debug!("cleared");
        self.notify(path::ROOT);
        Ok(())
    }

    /// Registers `callback`, called with the affected path after every successful
    /// mutation made through this instance, before the mutating call returns.
    pub fn watch<F>(&self, callback: F) -> WatchToken
    where
        F: Fn(&str) + 'static,
    {
        self.watchers.borrow_mut().add(Rc::new(callback))
    }

    /// Unregisters a callback. Returns `false` if the token is unknown.
    pub fn unwatch(&self, token: WatchToken) -> bool {
        self.watchers.borrow_mut().remove(token)
    }

    fn key(&self, path: &str) -> String {
        path::store_key(&self.options.namespace, path)
    }

    fn check_path(path: &str) -> VfsResult<()> {
        if path::is_valid(path) {
            Ok(())
        } else {
            Err(VfsError::InvalidPath(path.to_string()))
        }
    }

    /// Kind of the node actually stored at `path`, without the virtual root.
    fn stored_kind(&self, path: &str) -> Option<NodeKind> {
        let key = self.key(path);
        let store = self.store.borrow();
        if store.has(&path::children_key(&key)) {
            Some(NodeKind::Folder)
        } else if store.has(&path::content_key(&key)) {
            Some(NodeKind::File)
        } else {
            None
        }
    }

    /// What the namespace key currently holds.
    fn root_slot(&self) -> RootSlot {
        let key = self.key(path::ROOT);
        let store = self.store.borrow();
        if store.has(&path::children_key(&key)) {
            return RootSlot::Folder;
        }
        if store.has(&path::content_key(&key)) {
            return RootSlot::Occupied;
        }
        match store.get(&key) {
            None => RootSlot::Vacant { stored: false },
            Some(Value::Object(_)) => RootSlot::Vacant { stored: true },
            Some(_) => RootSlot::Occupied,
        }
    }

    /// Raw stored subtree at `path`.
    ///
    /// The root is rebuilt from its `children` map alone, so whatever else the host
    /// keeps next to it under the namespace is never copied.
    fn subtree(&self, path: &str) -> Option<Value> {
        if !path::is_valid(path) {
            return None;
        }
        if path::is_root(path) {
            self.kind(path)?;
            let children = self
                .store
                .borrow()
                .get(&path::children_key(&self.key(path)))
                .unwrap_or_else(|| Value::Object(Map::new()));
            return Some(folder_node(children));
        }
        self.store.borrow().get(&self.key(path))
    }

    fn notify(&self, path: &str) {
        let watchers = self.watchers.borrow().snapshot();
        for watcher in watchers {
            watcher(path);
        }
    }

    fn create(&self, path: &str, node: Node<T>) -> VfsResult<()> {
        Self::check_path(path)?;
        if path::is_root(path) || self.exists(path) {
            return Err(VfsError::AlreadyExists(path.to_string()));
        }
        let kind = node.kind();
        self.write_node(path, serde_json::to_value(&node)?)?;
        debug!(path, %kind, "created");
        self.notify(path);
        Ok(())
    }

    /// Stores `value` at the non-root `path` together with its missing ancestors.
    ///
    /// Missing ancestor folders are folded around `value` in memory and the result
    /// goes out in a single `set` at the topmost missing key, so a failing store
    /// leaves nothing behind.
    fn write_node(&self, path: &str, value: Value) -> VfsResult<()> {
        let mut target = path.to_string();
        let mut value = value;
        let mut missing = 0usize;
        while let Some(parent) = path::parent_of(&target) {
            let token = target[parent.len() + 1..].to_string();
            if path::is_root(parent) {
                match self.root_slot() {
                    RootSlot::Folder => break,
                    RootSlot::Occupied => return Err(not_a_folder(parent)),
                    RootSlot::Vacant { stored } => {
                        self.write_root_children(stored, Map::from_iter([(token, value)]))?;
                        trace!(path, missing, "materialized ancestors up to the root");
                        return Ok(());
                    }
                }
            }
            match self.stored_kind(parent) {
                Some(NodeKind::Folder) => break,
                Some(NodeKind::File) => return Err(not_a_folder(parent)),
                None if self.store.borrow().has(&self.key(parent)) => {
                    return Err(not_a_folder(parent));
                }
                None => {
                    value = folder_node(Value::Object(Map::from_iter([(token, value)])));
                    target = parent.to_string();
                    missing += 1;
                }
            }
        }
        self.store.borrow_mut().set(&self.key(&target), Some(value))?;
        if missing > 0 {
            trace!(path, missing, "materialized ancestors");
        }
        Ok(())
    }

    /// Replaces the root's `children` map. An absent namespace key gets a whole
    /// folder node instead, so the store never has to invent the parent map.
    fn write_root_children(&self, stored: bool, children: Map<String, Value>) -> VfsResult<()> {
        let key = self.key(path::ROOT);
        let (key, value) = if stored {
            (path::children_key(&key), Value::Object(children))
        } else {
            (key, folder_node(Value::Object(children)))
        };
        self.store.borrow_mut().set(&key, Some(value))?;
        Ok(())
    }

    fn try_delete(&self, path: &str) -> VfsResult<()> {
        Self::check_path(path)?;
        if path::is_root(path) {
            return Err(VfsError::RootProtected);
        }
        if !self.exists(path) {
            return Err(VfsError::NotFound(path.to_string()));
        }
        self.store.borrow_mut().set(&self.key(path), None)?;
        debug!(path, "deleted");
        self.notify(path);
        Ok(())
    }

    fn try_copy(&self, src: &str, dst: &str) -> VfsResult<()> {
        Self::check_path(src)?;
        Self::check_path(dst)?;
        if !self.exists(src) {
            return Err(VfsError::NotFound(src.to_string()));
        }
        if path::is_root(dst) || self.exists(dst) {
            return Err(VfsError::AlreadyExists(dst.to_string()));
        }
        // taken before any write so copying a folder below itself terminates
        let snapshot = self
            .subtree(src)
            .ok_or_else(|| VfsError::NotFound(src.to_string()))?;
        self.write_node(dst, snapshot)?;
        debug!(src, dst, "copied");
        self.notify(dst);
        Ok(())
    }

    fn try_move(&self, src: &str, dst: &str) -> VfsResult<()> {
        Self::check_path(src)?;
        Self::check_path(dst)?;
        if self.is_folder(src) && path::is_ancestor_of(src, dst) {
            return Err(VfsError::CycleRejected {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }
        self.try_copy(src, dst)?;
        self.try_delete(src).inspect_err(|err| {
            warn!(src, dst, error = %err, "move copied the node but could not delete the source")
        })
    }

    fn try_rename(&self, path: &str, name: &str) -> VfsResult<String> {
        Self::check_path(path)?;
        let parent = path::parent_of(path).ok_or(VfsError::RootProtected)?;
        let target = path::child(parent, name);
        self.try_move(path, &target)?;
        Ok(target)
    }

    fn try_set_data(&self, path: &str, content: T) -> VfsResult<()> {
        Self::check_path(path)?;
        match self.kind(path) {
            None => return Err(VfsError::NotFound(path.to_string())),
            Some(NodeKind::Folder) => {
                return Err(VfsError::WrongType {
                    path: path.to_string(),
                    expected: NodeKind::File,
                });
            }
            Some(NodeKind::File) => {}
        }
        let value = serde_json::to_value(&content)?;
        self.store
            .borrow_mut()
            .set(&path::content_key(&self.key(path)), Some(value))?;
        debug!(path, "content updated");
        self.notify(path);
        Ok(())
    }
}

/// State of the namespace key that holds the root folder.
enum RootSlot {
    /// A `children` map is stored.
    Folder,
    /// Nothing usable yet; `stored` tells whether a bare map already sits there.
    Vacant { stored: bool },
    /// A scalar or a file-shaped value.
    Occupied,
}

fn not_a_folder(path: &str) -> VfsError {
    VfsError::WrongType {
        path: path.to_string(),
        expected: NodeKind::Folder,
    }
}

/// Stored shape of a folder holding `children`.
fn folder_node(children: Value) -> Value {
    Value::Object(Map::from_iter([(path::CHILDREN_FIELD.to_string(), children)]))
}

fn rejected(op: &'static str, path: &str, err: &VfsError) {
    debug!(op, path, kind = err.kind(), error = %err, "rejected");
}

fn collect_descendants(path: &str, node: &Value, found: &mut Vec<String>) {
    let Some(Value::Object(children)) = node.get("children") else {
        return;
    };
    for (token, child) in children {
        let child_path = path::join(path, token);
        found.push(child_path.clone());
        collect_descendants(&child_path, child, found);
    }
}
