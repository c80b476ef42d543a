//! Incremental replication of JSON-shaped state through flat path-keyed deltas.
//!
//! `json-sync` keeps a replica of an application state tree in step with an
//! authoritative copy by exchanging minimal leaf-level changes instead of
//! full snapshots.
//!
//! # Core Concepts
//!
//! - **FlattenedState**: dotted path → scalar leaf map. Containers exist only
//!   through their descendants' keys.
//! - **flatten**: nested data (any `T: Serialize`) → `FlattenedState`
//! - **diff**: two flattened states → ordered Set/Delete [`Change`]s
//! - **apply_changes**: change list → in-place mutation of a flattened state
//! - **rebuild**: flattened state + path → nested value, with array/object
//!   shape inferred from key structure
//! - **Provider**: owns the live source and emits deltas through a
//!   [`ChangeSink`]
//! - **Receiver**: owns the replica and notifies watchers scoped to sub-paths
//!
//! # Wire Format
//!
//! ```text
//! {"$":"S","p":"baz.bob","v":false}
//! {"$":"D","p":"baz.3"}
//! ```
//!
//! A change list is an ordered JSON array of these records. The full
//! snapshot used to seed a receiver is the `FlattenedState` as a flat JSON
//! object.
//!
//! # Quick Start
//!
//! ```
//! use json_sync::{Change, Provider, Receiver};
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//!
//! let receiver = Arc::new(Mutex::new(Receiver::new()));
//! let transport = Arc::clone(&receiver);
//! let mut provider = Provider::new(
//!     json!({"foo": "bar", "baz": {"bob": true}}),
//!     move |changes: &[Change]| {
//!         transport.lock().unwrap().apply_changes(changes).unwrap();
//!     },
//! )
//! .unwrap();
//!
//! // Seed the replica with a full copy.
//! receiver.lock().unwrap().set_state(provider.snapshot());
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let listener_seen = Arc::clone(&seen);
//! let _watch = receiver.lock().unwrap().watch_path("baz", move |value| {
//!     listener_seen.lock().unwrap().push(value.clone());
//! });
//!
//! provider.source_mut()["baz"]["bob"] = json!(false);
//! provider.sync().unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![json!({"bob": false})]);
//! assert_eq!(receiver.lock().unwrap().get_value("foo").unwrap(), json!("bar"));
//! ```
//!
//! # Threading
//!
//! Every operation is synchronous and runs to completion. Providers and
//! receivers do no internal locking; share them across threads behind a
//! `Mutex` like any other owned value.

pub mod path;

mod change;
mod config;
mod diff;
mod error;
mod flatten;
mod patch;
mod provider;
mod rebuild;
mod receiver;
mod state;
mod value;

// Core types
pub use change::{decode_changes, encode_changes, Change};
pub use error::{SyncError, SyncResult};
pub use state::FlattenedState;
pub use value::{data_type_name, Data, Value};

// Algorithms
pub use diff::diff;
pub use flatten::{flatten, flatten_value};
pub use patch::{apply_changes, touched_paths};
pub use rebuild::rebuild;

// Replication
pub use config::{ProviderConfig, ReceiverConfig, WatchMatch};
pub use provider::{ChangeSink, ChannelSink, Provider, SyncSummary};
pub use receiver::{Listener, Receiver, WatchHandle};
