//! Composite path algebra.
//!
//! A path is the concatenation of `/<token>` segments from the root down to the
//! target, where every token is produced by [`codec::encode`]. The root is the empty
//! path. Nothing here touches storage.

use crate::core::codec::{self, DELIMITER, KEY_SEPARATOR};

/// The root path.
pub const ROOT: &str = "";

pub(crate) const CHILDREN_FIELD: &str = "children";
const CONTENT_FIELD: &str = "content";

/// Returns the path of the child `name` of `parent`.
pub fn child(parent: &str, name: &str) -> String {
    join(parent, &codec::encode(name))
}

/// Appends an already encoded `token` to `parent`.
pub fn join(parent: &str, token: &str) -> String {
    let mut path = String::with_capacity(parent.len() + token.len() + 1);
    path.push_str(parent);
    path.push(DELIMITER);
    path.push_str(token);
    path
}

/// Returns the parent path, or `None` for the root.
pub fn parent_of(path: &str) -> Option<&str> {
    if is_root(path) {
        return None;
    }
    path.rfind(DELIMITER).map(|idx| &path[..idx])
}

/// Returns the decoded last segment; empty for the root.
pub fn name_of(path: &str) -> String {
    match path.rfind(DELIMITER) {
        Some(idx) => codec::decode(&path[idx + 1..]),
        None => String::new(),
    }
}

pub fn is_root(path: &str) -> bool {
    path.is_empty()
}

/// Iterates over the encoded segments of `path`, root first.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(DELIMITER).skip(1)
}

/// Decoded names from the root down to `path`.
pub fn names(path: &str) -> Vec<String> {
    segments(path).map(codec::decode).collect()
}

/// Builds a path from decoded names, root first.
pub fn from_names<I, N>(names: I) -> String
where
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    names
        .into_iter()
        .fold(String::from(ROOT), |parent, name| child(&parent, name.as_ref()))
}

/// Checks that `path` is the root or a sequence of well-formed `/token` segments.
pub fn is_valid(path: &str) -> bool {
    if is_root(path) {
        return true;
    }
    path.starts_with(DELIMITER) && segments(path).all(codec::is_token)
}

/// Checks whether `ancestor` is `path` itself or one of its ancestors.
///
/// The comparison is segment by segment: `/ab` is not an ancestor of `/abc`.
pub fn is_ancestor_of(ancestor: &str, path: &str) -> bool {
    let mut outer = segments(ancestor);
    let mut inner = segments(path);
    loop {
        match (outer.next(), inner.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(a), Some(b)) if a != b => return false,
            _ => {}
        }
    }
}

/// Translates `path` into the nested store key of its node under `namespace`.
///
/// `/a/b` under `vfs` becomes `vfs.children.a.children.b`.
pub fn store_key(namespace: &str, path: &str) -> String {
    let mut key = String::from(namespace);
    for segment in segments(path) {
        push_field(&mut key, CHILDREN_FIELD);
        push_field(&mut key, segment);
    }
    key
}

/// Store key of the children map of the folder at `node_key`.
pub fn children_key(node_key: &str) -> String {
    field_key(node_key, CHILDREN_FIELD)
}

/// Store key of the content of the file at `node_key`.
pub fn content_key(node_key: &str) -> String {
    field_key(node_key, CONTENT_FIELD)
}

fn field_key(node_key: &str, field: &str) -> String {
    let mut key = String::from(node_key);
    push_field(&mut key, field);
    key
}

fn push_field(key: &mut String, field: &str) {
    if !key.is_empty() {
        key.push(KEY_SEPARATOR);
    }
    key.push_str(field);
}

/// Renders decoded `names` for display.
///
/// The root renders as the bare `delimiter`; every folder name is followed by the
/// delimiter, the final name only when `target_is_folder`.
pub fn format<N: AsRef<str>>(names: &[N], delimiter: &str, target_is_folder: bool) -> String {
    let mut out = String::from(delimiter);
    for (idx, name) in names.iter().enumerate() {
        out.push_str(name.as_ref());
        if idx + 1 < names.len() || target_is_folder {
            out.push_str(delimiter);
        }
    }
    out
}
