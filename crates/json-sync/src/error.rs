//! Error types for json-sync operations.

use thiserror::Error;

/// Result type alias for json-sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while flattening, encoding or replicating state.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A value that has no JSON scalar/container representation was found
    /// while flattening.
    #[error("unsupported type at \"{path}\": {kind}")]
    UnsupportedType {
        /// Dotted path of the offending value (empty for the root).
        path: String,
        /// Short description of what was found.
        kind: String,
    },

    /// A receiver operation was invoked before `set_state`.
    #[error("cannot {operation} before \"set_state\" has been called")]
    Uninitialized {
        /// The receiver operation that was attempted.
        operation: &'static str,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Create an unsupported type error.
    #[inline]
    pub fn unsupported_type(path: impl Into<String>, kind: impl Into<String>) -> Self {
        SyncError::UnsupportedType {
            path: path.into(),
            kind: kind.into(),
        }
    }

    /// Create an uninitialized receiver error.
    #[inline]
    pub fn uninitialized(operation: &'static str) -> Self {
        SyncError::Uninitialized { operation }
    }

    /// Returns the dotted path attached to this error, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            SyncError::UnsupportedType { path, .. } => Some(path),
            _ => None,
        }
    }
}
