//! Replica side: applies change lists and notifies path watchers.
//!
//! A receiver must be seeded with [`Receiver::set_state`] (usually from
//! [`Provider::snapshot`](crate::Provider::snapshot)) before changes can be
//! applied or values read. Watchers may be registered at any time.
//!
//! After each applied list, every watcher whose path matches at least one
//! changed leaf is called once with the rebuilt value of its *own* path, not
//! the changed leaf itself.

use crate::patch::touched_paths;
use crate::{
    apply_changes, diff, rebuild, Change, Data, FlattenedState, ReceiverConfig, SyncError,
    SyncResult,
};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Callback invoked with the current value of a watched path.
pub type Listener = Box<dyn FnMut(&Data) + Send>;

/// Registration handle returned by [`Receiver::watch_path`].
///
/// The handle only identifies the watcher; the receiver owns the listener.
/// Dropping the handle does not unregister anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "a watch can only be removed through its handle"]
pub struct WatchHandle(u64);

impl WatchHandle {
    /// Numeric id of this registration.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }

    /// Remove the watcher from `receiver`. Returns false if it was already
    /// removed.
    pub fn unsubscribe(self, receiver: &mut Receiver) -> bool {
        receiver.unwatch(self)
    }
}

struct Watch {
    id: u64,
    path: String,
    listener: Listener,
}

/// Holds a replica of a provider's flattened state.
///
/// # Example
///
/// ```
/// use json_sync::{flatten, Change, Receiver};
/// use serde_json::json;
/// use std::sync::{Arc, Mutex};
///
/// let mut receiver = Receiver::new();
/// receiver.set_state(flatten(&json!({"foo": "bar", "baz": {"bob": true}})).unwrap());
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let watch = receiver.watch_path("baz", move |value| sink.lock().unwrap().push(value.clone()));
///
/// receiver.apply_changes(&[Change::set("baz.bob", false)]).unwrap();
/// assert_eq!(*seen.lock().unwrap(), vec![json!({"bob": false})]);
///
/// watch.unsubscribe(&mut receiver);
/// receiver.apply_changes(&[Change::set("baz.bob", true)]).unwrap();
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct Receiver {
    state: Option<FlattenedState>,
    watches: Vec<Watch>,
    next_id: u64,
    config: ReceiverConfig,
}

impl Receiver {
    /// Create an unseeded receiver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ReceiverConfig::default())
    }

    /// Create an unseeded receiver with an explicit configuration.
    pub fn with_config(config: ReceiverConfig) -> Self {
        Self {
            state: None,
            watches: Vec::new(),
            next_id: 0,
            config,
        }
    }

    /// Install or overwrite the replica. Watchers are not notified.
    pub fn set_state(&mut self, state: FlattenedState) {
        debug!(leaves = state.len(), "replica state installed");
        self.state = Some(state);
    }

    /// Apply a change list to the replica and notify matching watchers.
    ///
    /// Returns the number of listener invocations.
    pub fn apply_changes(&mut self, changes: &[Change]) -> SyncResult<usize> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| SyncError::uninitialized("apply changes"))?;
        apply_changes(state, changes);

        let notified = self.notify(&touched_paths(changes));
        debug!(changes = changes.len(), notified, "applied state changes");
        Ok(notified)
    }

    /// Replace the replica with a full snapshot, notifying watchers as if
    /// the difference had arrived as a change list.
    ///
    /// Used to recover after the transport dropped changes. Returns the
    /// number of listener invocations.
    pub fn resync(&mut self, state: FlattenedState) -> SyncResult<usize> {
        let current = self
            .state
            .as_ref()
            .ok_or_else(|| SyncError::uninitialized("resync"))?;
        let changes = diff(current, &state);
        self.state = Some(state);

        let notified = self.notify(&touched_paths(&changes));
        debug!(changes = changes.len(), notified, "replica resynced");
        Ok(notified)
    }

    /// Register `listener` to be called whenever a change touches `path`
    /// (per [`ReceiverConfig::watch_match`]).
    pub fn watch_path(
        &mut self,
        path: impl Into<String>,
        listener: impl FnMut(&Data) + Send + 'static,
    ) -> WatchHandle {
        let id = self.next_id;
        self.next_id += 1;
        let path = path.into();
        trace!(id, path = %path, "watch registered");
        self.watches.push(Watch {
            id,
            path,
            listener: Box::new(listener),
        });
        WatchHandle(id)
    }

    /// Remove a watcher. Returns false if it was already removed.
    pub fn unwatch(&mut self, handle: WatchHandle) -> bool {
        match self.watches.iter().position(|w| w.id == handle.0) {
            Some(index) => {
                let watch = self.watches.remove(index);
                trace!(id = watch.id, path = %watch.path, "watch removed");
                true
            }
            None => false,
        }
    }

    /// Rebuild the current value at `path`.
    pub fn get_value(&self, path: &str) -> SyncResult<Data> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| SyncError::uninitialized("get the value of a state path"))?;
        Ok(rebuild(path, state))
    }

    /// The replica, if seeded.
    #[inline]
    pub fn state(&self) -> Option<&FlattenedState> {
        self.state.as_ref()
    }

    /// Returns true once `set_state` has been called.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Number of registered watchers.
    #[inline]
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    /// The receiver configuration.
    #[inline]
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    // `&mut self` keeps listeners from reaching back into the registry while
    // it is being iterated.
    fn notify(&mut self, touched: &BTreeSet<&str>) -> usize {
        let Some(state) = self.state.as_ref() else {
            return 0;
        };
        if touched.is_empty() {
            return 0;
        }

        let watch_match = self.config.watch_match;
        let mut notified = 0;
        for watch in &mut self.watches {
            if touched
                .iter()
                .any(|changed| watch_match.matches(&watch.path, changed))
            {
                let value = rebuild(&watch.path, state);
                (watch.listener)(&value);
                notified += 1;
            }
        }
        notified
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("state", &self.state)
            .field(
                "watches",
                &self.watches.iter().map(|w| &w.path).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}
