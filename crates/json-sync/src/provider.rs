//! Authoritative side: turns mutations of a live source into change lists.
//!
//! The provider keeps the last confirmed snapshot of its source. `sync`
//! re-flattens the source, diffs it against that snapshot, and only when
//! something changed advances the snapshot and hands the changes to the
//! sink. Delivery is fire-and-forget: if the transport loses a list, the
//! snapshot has already moved on and the caller must reseed receivers from
//! [`Provider::snapshot`].

use crate::{apply_changes, diff, flatten, Change, FlattenedState, ProviderConfig, SyncResult};
use serde::Serialize;
use std::sync::mpsc::Sender;
use tracing::{debug, trace, warn};

/// Transport for outgoing change lists.
///
/// Implemented for every `FnMut(&[Change])` closure. Closures passed
/// directly to [`Provider::new`] need their argument annotated
/// (`|changes: &[Change]| ...`).
pub trait ChangeSink {
    /// Deliver one ordered change list. The list is never empty unless
    /// [`ProviderConfig::relay_empty`] is set.
    fn send_changes(&mut self, changes: &[Change]);
}

impl<F> ChangeSink for F
where
    F: FnMut(&[Change]),
{
    fn send_changes(&mut self, changes: &[Change]) {
        self(changes)
    }
}

/// Sink that forwards each change list over an `mpsc` channel.
///
/// A disconnected receiver is logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink(Sender<Vec<Change>>);

impl ChannelSink {
    /// Wrap a channel sender.
    pub fn new(sender: Sender<Vec<Change>>) -> Self {
        Self(sender)
    }
}

impl ChangeSink for ChannelSink {
    fn send_changes(&mut self, changes: &[Change]) {
        if let Err(e) = self.0.send(changes.to_vec()) {
            warn!(error = %e, changes = changes.len(), "failed to send state changes");
        }
    }
}

/// Counts of what a sync or relay sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of Set changes sent.
    pub sets: usize,
    /// Number of Delete changes sent.
    pub deletes: usize,
}

impl SyncSummary {
    fn of(changes: &[Change]) -> Self {
        let sets = changes.iter().filter(|c| c.is_set()).count();
        Self {
            sets,
            deletes: changes.len() - sets,
        }
    }

    /// Total number of changes sent.
    #[inline]
    pub fn total(&self) -> usize {
        self.sets + self.deletes
    }

    /// Returns true if nothing was sent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Owns a live source and emits minimal deltas of it.
///
/// # Example
///
/// ```
/// use json_sync::{Change, Provider};
/// use serde_json::json;
///
/// let mut sent: Vec<Vec<Change>> = Vec::new();
/// let mut provider = Provider::new(json!({"foo": "bar"}), |changes: &[Change]| {
///     sent.push(changes.to_vec());
/// })
/// .unwrap();
///
/// provider.source_mut()["foo"] = json!("baz");
/// let summary = provider.sync().unwrap();
/// assert_eq!(summary.sets, 1);
///
/// // Nothing changed since the last sync: nothing is sent.
/// assert!(provider.sync().unwrap().is_empty());
///
/// drop(provider);
/// assert_eq!(sent, vec![vec![Change::set("foo", "baz")]]);
/// ```
pub struct Provider<T, S> {
    source: T,
    sink: S,
    confirmed: FlattenedState,
    config: ProviderConfig,
}

impl<T, S> Provider<T, S>
where
    T: Serialize,
    S: ChangeSink,
{
    /// Create a provider with the default configuration.
    ///
    /// The initial snapshot is taken immediately; nothing is sent.
    pub fn new(source: T, sink: S) -> SyncResult<Self> {
        Self::with_config(source, sink, ProviderConfig::default())
    }

    /// Create a provider with an explicit configuration.
    pub fn with_config(source: T, sink: S, config: ProviderConfig) -> SyncResult<Self> {
        let confirmed = flatten(&source)?;
        Ok(Self {
            source,
            sink,
            confirmed,
            config,
        })
    }

    /// Diff the live source against the confirmed snapshot and send the
    /// changes, if any.
    ///
    /// The snapshot only advances after the source flattened successfully;
    /// on error nothing is sent and the snapshot is unchanged.
    pub fn sync(&mut self) -> SyncResult<SyncSummary> {
        let probably_changed = flatten(&self.source)?;
        let changes = diff(&self.confirmed, &probably_changed);

        if changes.is_empty() {
            trace!("source unchanged, nothing to sync");
            return Ok(SyncSummary::default());
        }

        self.confirmed = probably_changed;
        let summary = SyncSummary::of(&changes);
        debug!(
            sets = summary.sets,
            deletes = summary.deletes,
            "sending state changes"
        );
        self.sink.send_changes(&changes);
        Ok(summary)
    }

    /// Apply an externally produced change list to the confirmed snapshot
    /// and relay it unchanged.
    ///
    /// Used in fan-out topologies where this provider forwards an upstream
    /// stream. The live source is not touched, so a later `sync` diffs the
    /// source against the relayed snapshot.
    pub fn sync_changes(&mut self, changes: &[Change]) -> SyncSummary {
        if changes.is_empty() && !self.config.relay_empty {
            trace!("empty relay suppressed");
            return SyncSummary::default();
        }

        apply_changes(&mut self.confirmed, changes);
        let summary = SyncSummary::of(changes);
        debug!(
            sets = summary.sets,
            deletes = summary.deletes,
            "relaying state changes"
        );
        self.sink.send_changes(changes);
        summary
    }
}

impl<T, S> Provider<T, S> {
    /// The confirmed snapshot: what receivers have been sent so far.
    #[inline]
    pub fn get_state(&self) -> &FlattenedState {
        &self.confirmed
    }

    /// Owned copy of the confirmed snapshot, for seeding a new receiver.
    #[inline]
    pub fn snapshot(&self) -> FlattenedState {
        self.confirmed.clone()
    }

    /// The live source.
    #[inline]
    pub fn source(&self) -> &T {
        &self.source
    }

    /// Mutable access to the live source. Changes are sent on the next
    /// [`Provider::sync`].
    #[inline]
    pub fn source_mut(&mut self) -> &mut T {
        &mut self.source
    }

    /// Mutate the live source through a closure without syncing.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.source)
    }

    /// The transport sink.
    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the transport sink.
    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The provider configuration.
    #[inline]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Consume the provider, returning source, sink and confirmed snapshot.
    pub fn into_parts(self) -> (T, S, FlattenedState) {
        (self.source, self.sink, self.confirmed)
    }
}

impl<T: std::fmt::Debug, S> std::fmt::Debug for Provider<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("source", &self.source)
            .field("confirmed", &self.confirmed)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SyncError, Value};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::mpsc;

    fn recording_provider(
        source: serde_json::Value,
    ) -> Provider<serde_json::Value, impl FnMut(&[Change])> {
        let mut log: Vec<Vec<Change>> = Vec::new();
        Provider::new(source, move |changes: &[Change]| log.push(changes.to_vec())).unwrap()
    }

    #[test]
    fn test_new_takes_initial_snapshot() {
        let provider = recording_provider(json!({"foo": "bar", "baz": [1, 2]}));
        let state = provider.get_state();
        assert_eq!(state.len(), 3);
        assert_eq!(state.get("baz.1"), Some(&Value::from(2)));
    }

    #[test]
    fn test_sync_unchanged_sends_nothing() {
        let (tx, rx) = mpsc::channel();
        let mut provider = Provider::new(json!({"foo": "bar"}), ChannelSink::new(tx)).unwrap();

        assert!(provider.sync().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sync_sends_and_advances_snapshot() {
        let (tx, rx) = mpsc::channel();
        let mut provider = Provider::new(json!({"foo": "bar"}), ChannelSink::new(tx)).unwrap();

        provider.source_mut()["foo"] = json!("baz");
        let summary = provider.sync().unwrap();
        assert_eq!(summary, SyncSummary { sets: 1, deletes: 0 });
        assert_eq!(rx.try_recv().unwrap(), vec![Change::set("foo", "baz")]);
        assert_eq!(provider.get_state().get("foo"), Some(&Value::from("baz")));

        // Second sync with no further edits is suppressed.
        assert!(provider.sync().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sync_reports_deletes() {
        let mut provider = recording_provider(json!({"baz": ["a", "b", "c"]}));
        provider.update(|src| {
            src["baz"].as_array_mut().unwrap().truncate(1);
        });
        let summary = provider.sync().unwrap();
        assert_eq!(summary, SyncSummary { sets: 0, deletes: 2 });
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn test_sync_flatten_failure_keeps_snapshot() {
        let mut sent = 0usize;
        let source: BTreeMap<String, f64> = BTreeMap::from([("ratio".to_string(), 1.0)]);
        let mut provider = Provider::new(source, |_: &[Change]| sent += 1).unwrap();

        provider.source_mut().insert("ratio".into(), f64::INFINITY);
        let err = provider.sync().unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedType { ref path, .. } if path == "ratio"));
        assert_eq!(provider.get_state().get("ratio"), Value::from_f64(1.0).as_ref());

        drop(provider);
        assert_eq!(sent, 0);
    }

    #[test]
    fn test_new_fails_on_unsupported_source() {
        let result = Provider::new(vec![f64::NAN], |_: &[Change]| {});
        assert!(matches!(result, Err(SyncError::UnsupportedType { .. })));
    }

    #[test]
    fn test_sync_changes_relays_and_patches_snapshot() {
        let (tx, rx) = mpsc::channel();
        let mut provider = Provider::new(json!({"a": 1}), ChannelSink::new(tx)).unwrap();

        let upstream = vec![Change::set("b", 2), Change::delete("a")];
        let summary = provider.sync_changes(&upstream);

        assert_eq!(summary, SyncSummary { sets: 1, deletes: 1 });
        assert_eq!(rx.try_recv().unwrap(), upstream);
        assert!(!provider.get_state().contains("a"));
        assert_eq!(provider.get_state().get("b"), Some(&Value::from(2)));
    }

    #[test]
    fn test_sync_changes_empty_suppressed_by_default() {
        let (tx, rx) = mpsc::channel();
        let mut provider = Provider::new(json!({}), ChannelSink::new(tx)).unwrap();
        assert!(provider.sync_changes(&[]).is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_sync_changes_empty_relayed_when_configured() {
        let (tx, rx) = mpsc::channel();
        let config = ProviderConfig::default().with_relay_empty(true);
        let mut provider = Provider::with_config(json!({}), ChannelSink::new(tx), config).unwrap();
        provider.sync_changes(&[]);
        assert_eq!(rx.try_recv().unwrap(), Vec::<Change>::new());
    }

    #[test]
    fn test_channel_sink_disconnected_does_not_fail_sync() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut provider = Provider::new(json!({"x": 1}), ChannelSink::new(tx)).unwrap();
        provider.source_mut()["x"] = json!(2);

        // Snapshot advances even though delivery failed.
        assert_eq!(provider.sync().unwrap().sets, 1);
        assert_eq!(provider.get_state().get("x"), Some(&Value::from(2)));
    }

    #[test]
    fn test_into_parts() {
        let provider = recording_provider(json!({"k": "v"}));
        let (source, _sink, state) = provider.into_parts();
        assert_eq!(source, json!({"k": "v"}));
        assert_eq!(state.get("k"), Some(&Value::from("v")));
    }
}
