//! Provider and receiver configuration.
//!
//! Both structs deserialize with defaults for every missing field, so they
//! can be embedded in a host application's config file.

use serde::{Deserialize, Serialize};

/// How a watch path is matched against changed leaf paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchMatch {
    /// Plain string prefix: `"ba"` fires for a change at `"baz.bob"`.
    #[default]
    StringPrefix,
    /// Segment-aware prefix: the watch path must equal the changed path or
    /// be followed by a separator in it.
    Segment,
}

impl WatchMatch {
    /// Returns true if a watcher on `watched` should fire for a change at
    /// `changed`. The empty watch path matches everything.
    #[inline]
    pub fn matches(self, watched: &str, changed: &str) -> bool {
        match self {
            WatchMatch::StringPrefix => changed.starts_with(watched),
            WatchMatch::Segment => crate::path::is_segment_prefix(watched, changed),
        }
    }
}

/// Provider behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Forward empty change lists passed to `sync_changes` instead of
    /// dropping them.
    pub relay_empty: bool,
}

impl ProviderConfig {
    /// Set whether empty relayed change lists are forwarded.
    #[must_use]
    pub fn with_relay_empty(mut self, relay_empty: bool) -> Self {
        self.relay_empty = relay_empty;
        self
    }
}

/// Receiver behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Matching rule between watch paths and changed paths.
    pub watch_match: WatchMatch,
}

impl ReceiverConfig {
    /// Set the watch matching rule.
    #[must_use]
    pub fn with_watch_match(mut self, watch_match: WatchMatch) -> Self {
        self.watch_match = watch_match;
        self
    }
}
