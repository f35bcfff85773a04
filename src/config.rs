use serde::{Deserialize, Serialize};

/// Engine settings.
///
/// Hosts usually keep these next to their own configuration, so the struct
/// deserializes from JSON with every field optional:
///
/// ```
/// let options: kvfs_kit::VfsOptions = serde_json::from_str(r#"{"namespace": "notes"}"#).unwrap();
/// assert_eq!(options.namespace, "notes");
/// assert_eq!(options.display_delimiter, "/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfsOptions {
    /// Store key under which the root folder lives (may itself be `.`-nested).
    pub namespace: String,

    /// Delimiter used by `format_path` and `Display` of path handles.
    pub display_delimiter: String,
}

impl VfsOptions {
    pub fn new<N: Into<String>>(namespace: N) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_display_delimiter<D: Into<String>>(mut self, delimiter: D) -> Self {
        self.display_delimiter = delimiter.into();
        self
    }
}

impl Default for VfsOptions {
    fn default() -> Self {
        Self {
            namespace: "vfs".to_string(),
            display_delimiter: "/".to_string(),
        }
    }
}
