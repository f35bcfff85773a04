use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Folder,
    File,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Folder => f.write_str("folder"),
            NodeKind::File => f.write_str("file"),
        }
    }
}

/// A node as it is serialized into the backing store.
///
/// Folders are `{"children": {<token>: <node>}}`, files are `{"content": <T>}`.
/// Children are keyed by encoded name tokens, not by decoded names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node<T> {
    Folder { children: BTreeMap<String, Node<T>> },
    File { content: T },
}

impl<T> Node<T> {
    pub fn folder() -> Self {
        Node::Folder {
            children: BTreeMap::new(),
        }
    }

    pub fn file(content: T) -> Self {
        Node::File { content }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Folder { .. } => NodeKind::Folder,
            Node::File { .. } => NodeKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind() == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind() == NodeKind::File
    }

    /// File content, `None` for folders.
    pub fn content(&self) -> Option<&T> {
        match self {
            Node::File { content } => Some(content),
            Node::Folder { .. } => None,
        }
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        match self {
            Node::File { .. } => 1,
            Node::Folder { children } => 1 + children.values().map(Node::node_count).sum::<usize>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_folder_serialization_shape() {
        let node: Node<Value> = Node::folder();
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"children": {}}));
    }

    #[test]
    fn test_file_serialization_shape() {
        let node = Node::file(json!({"n": 1}));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"content": {"n": 1}})
        );
    }

    #[test]
    fn test_deserialize_nested_tree() {
        let value = json!({
            "children": {
                "a": {"children": {"f~dtxt": {"content": "hi"}}},
                "b": {"content": null}
            }
        });
        let node: Node<Value> = serde_json::from_value(value).unwrap();

        assert!(node.is_folder());
        assert_eq!(node.node_count(), 4);
        let Node::Folder { children } = &node else {
            panic!("root must be a folder");
        };
        assert_eq!(children["b"].kind(), NodeKind::File);
        assert_eq!(children["b"].content(), Some(&Value::Null));
        assert!(children["a"].is_folder());
    }

    #[test]
    fn test_file_content_that_looks_like_a_folder() {
        // the payload itself has a "children" field; the node stays a file
        let value = json!({"content": {"children": {}}});
        let node: Node<Value> = serde_json::from_value(value).unwrap();
        assert!(node.is_file());
    }
}
