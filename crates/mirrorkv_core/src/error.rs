//! Error types for mirrorkv core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in `CachedStore` operations.
///
/// `NotConnected`, `NotFound` and `Persistence` are distinct on purpose:
/// callers can tell a refused operation from a missing key from a write
/// that was rolled back.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Operation attempted while the store is disconnected.
    #[error("store {store} is not connected")]
    NotConnected {
        /// Name of the store.
        store: String,
    },

    /// Key is absent and no fallback applies.
    #[error("key not found: {key}")]
    NotFound {
        /// The key that was not found.
        key: String,
    },

    /// The durable write failed and the mirror was rolled back.
    #[error("{action} on store {store} was not persisted: {source}")]
    Persistence {
        /// Name of the store.
        store: String,
        /// Label of the attempted mutation.
        action: String,
        /// The backend failure.
        #[source]
        source: mirrorkv_storage::StorageError,
    },

    /// Backend error outside a mutation (connect, load).
    #[error("storage error: {0}")]
    Storage(#[from] mirrorkv_storage::StorageError),

    /// The persisted keyspace could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The store address is unusable.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl CoreError {
    /// Creates a not-connected error.
    pub fn not_connected(store: impl Into<String>) -> Self {
        Self::NotConnected {
            store: store.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a codec error.
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Returns true for [`CoreError::NotConnected`].
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }

    /// Returns true for [`CoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`CoreError::Persistence`].
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirrorkv_storage::StorageError;

    #[test]
    fn kinds_are_distinct() {
        let not_connected = CoreError::not_connected("cache");
        let not_found = CoreError::not_found("foo");
        let persistence = CoreError::Persistence {
            store: "cache".into(),
            action: "set".into(),
            source: StorageError::injected("write failure"),
        };

        assert!(not_connected.is_not_connected() && !not_connected.is_not_found());
        assert!(not_found.is_not_found() && !not_found.is_persistence());
        assert!(persistence.is_persistence() && !persistence.is_not_connected());
    }

    #[test]
    fn persistence_message_names_action() {
        let err = CoreError::Persistence {
            store: "cache".into(),
            action: "delete".into(),
            source: StorageError::Closed,
        };
        let message = err.to_string();
        assert!(message.contains("delete"));
        assert!(message.contains("cache"));
    }
}
