mod handle;
mod kv_fs;
mod node;
mod watch;

pub use handle::VfsPath;
pub use kv_fs::KvFS;
pub use node::{Node, NodeKind};
pub use watch::{WatchToken, Watcher};
