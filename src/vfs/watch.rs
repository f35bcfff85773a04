//! Registry of mutation callbacks.

use std::collections::BTreeMap;
use std::rc::Rc;

/// Callback invoked with the raw path affected by a mutation.
pub type Watcher = Rc<dyn Fn(&str)>;

/// Opaque handle returned by `watch`, used to unregister the callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchToken(u64);

/// Token-keyed watcher registry.
///
/// Tokens are handed out in increasing order, so iterating the map yields the
/// watchers in registration order.
#[derive(Default)]
pub(crate) struct Watchers {
    next: u64,
    entries: BTreeMap<WatchToken, Watcher>,
}

impl Watchers {
    pub(crate) fn add(&mut self, watcher: Watcher) -> WatchToken {
        let token = WatchToken(self.next);
        self.next += 1;
        self.entries.insert(token, watcher);
        token
    }

    pub(crate) fn remove(&mut self, token: WatchToken) -> bool {
        self.entries.remove(&token).is_some()
    }

    /// Clones the current callbacks so they can run without holding the registry.
    pub(crate) fn snapshot(&self) -> Vec<Watcher> {
        self.entries.values().cloned().collect()
    }
}
