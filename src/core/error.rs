use thiserror::Error;

use crate::vfs::NodeKind;

/// Reasons a file system mutation is refused.
///
/// Paths carried by the variants are raw (encoded) paths as the engine saw them.
#[derive(Debug, Error)]
pub enum VfsError {
    #[error("{0:?} already exists")]
    AlreadyExists(String),

    #[error("{0:?} does not exist")]
    NotFound(String),

    #[error("cannot move {src:?} into its own subtree at {dst:?}")]
    CycleRejected { src: String, dst: String },

    #[error("{path:?} is not a {expected}")]
    WrongType { path: String, expected: NodeKind },

    #[error("the root folder cannot be removed, moved or renamed")]
    RootProtected,

    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("{0:?} belongs to another file system")]
    ForeignPath(String),

    #[error("content serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}

impl VfsError {
    /// Short machine-friendly name of the failure kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            VfsError::AlreadyExists(_) => "already_exists",
            VfsError::NotFound(_) => "not_found",
            VfsError::CycleRejected { .. } => "cycle_rejected",
            VfsError::WrongType { .. } => "wrong_type",
            VfsError::RootProtected => "root_protected",
            VfsError::InvalidPath(_) => "invalid_path",
            VfsError::ForeignPath(_) => "foreign_path",
            VfsError::Serialization(_) => "serialization",
            VfsError::Storage(_) => "storage",
        }
    }
}
