use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::{StorageAdapter, VfsError, path};
use crate::vfs::{KvFS, NodeKind};

type VfsResult<T> = std::result::Result<T, VfsError>;

/// A path bound to a file system instance.
///
/// Every method delegates to the underlying [`KvFS`]; navigation methods return new
/// handles instead of raw path strings. Two handles are equal when they point to the
/// same `KvFS` instance and hold the same raw path.
///
/// ```
/// use std::rc::Rc;
/// use kvfs_kit::{KvFS, MemoryStore, VfsPath};
/// use serde_json::json;
///
/// let fs = Rc::new(KvFS::new(MemoryStore::new()));
/// let root = VfsPath::root(&fs).unwrap();
/// let file = root.add_folder("a").unwrap().add_file("f", json!(1)).unwrap();
/// assert_eq!(file.to_string(), "/a/f");
/// ```
pub struct VfsPath<S, T = Value> {
    fs: Rc<KvFS<S, T>>,
    path: String,
}

impl<S, T> VfsPath<S, T>
where
    S: StorageAdapter,
    T: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<String>>(fs: &Rc<KvFS<S, T>>, path: P) -> Self {
        Self {
            fs: Rc::clone(fs),
            path: path.into(),
        }
    }

    /// Handle of the root folder, materializing it if needed.
    pub fn root(fs: &Rc<KvFS<S, T>>) -> VfsResult<Self> {
        let root = fs.root()?;
        Ok(Self::new(fs, root))
    }

    pub fn fs(&self) -> &Rc<KvFS<S, T>> {
        &self.fs
    }

    /// Raw (encoded) path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> String {
        path::name_of(&self.path)
    }

    pub fn is_root(&self) -> bool {
        path::is_root(&self.path)
    }

    pub fn parent(&self) -> Option<Self> {
        path::parent_of(&self.path).map(|parent| Self::new(&self.fs, parent))
    }

    /// Handle of the child `name`; the child need not exist.
    pub fn child(&self, name: &str) -> Self {
        Self::new(&self.fs, path::child(&self.path, name))
    }

    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.fs.kind(&self.path)
    }

    pub fn is_folder(&self) -> bool {
        self.fs.is_folder(&self.path)
    }

    pub fn is_file(&self) -> bool {
        self.fs.is_file(&self.path)
    }

    pub fn children(&self) -> Option<Vec<Self>> {
        let children = self.fs.children(&self.path)?;
        Some(children.into_iter().map(|p| Self::new(&self.fs, p)).collect())
    }

    pub fn data(&self) -> Option<T> {
        self.fs.data(&self.path)
    }

    pub fn set_data(&self, content: T) -> VfsResult<()> {
        self.fs.set_data(&self.path, content)
    }

    pub fn create_folder(&self) -> VfsResult<()> {
        self.fs.create_folder(&self.path)
    }

    pub fn create_file(&self, content: T) -> VfsResult<()> {
        self.fs.create_file(&self.path, content)
    }

    /// Creates the folder `name` inside this one and returns its handle.
    pub fn add_folder(&self, name: &str) -> VfsResult<Self> {
        let child = self.child(name);
        child.create_folder()?;
        Ok(child)
    }

    /// Creates the file `name` inside this folder and returns its handle.
    pub fn add_file(&self, name: &str, content: T) -> VfsResult<Self> {
        let child = self.child(name);
        child.create_file(content)?;
        Ok(child)
    }

    pub fn delete(&self) -> VfsResult<()> {
        self.fs.delete(&self.path)
    }

    pub fn copy_to(&self, dst: &Self) -> VfsResult<()> {
        self.check_same_fs(dst)?;
        self.fs.copy(&self.path, &dst.path)
    }

    pub fn move_to(&self, dst: &Self) -> VfsResult<()> {
        self.check_same_fs(dst)?;
        self.fs.move_to(&self.path, &dst.path)
    }

    /// Renames the node and returns the handle of its new location.
    pub fn rename(&self, name: &str) -> VfsResult<Self> {
        let renamed = self.fs.rename(&self.path, name)?;
        Ok(Self::new(&self.fs, renamed))
    }

    pub fn format(&self, delimiter: &str) -> String {
        self.fs.format_path(&self.path, delimiter)
    }

    fn check_same_fs(&self, other: &Self) -> VfsResult<()> {
        if Rc::ptr_eq(&self.fs, &other.fs) {
            Ok(())
        } else {
            Err(VfsError::ForeignPath(other.path.clone()))
        }
    }
}

impl<S, T> Clone for VfsPath<S, T> {
    fn clone(&self) -> Self {
        Self {
            fs: Rc::clone(&self.fs),
            path: self.path.clone(),
        }
    }
}

impl<S, T> PartialEq for VfsPath<S, T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.fs, &other.fs) && self.path == other.path
    }
}

impl<S, T> Eq for VfsPath<S, T> {}

impl<S, T> fmt::Debug for VfsPath<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VfsPath").field(&self.path).finish()
    }
}

impl<S, T> fmt::Display for VfsPath<S, T>
where
    S: StorageAdapter,
    T: Serialize + DeserializeOwned,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fs.display_path(&self.path))
    }
}
