//! Backend trait definitions.

use crate::error::StorageResult;
use crate::events::{EventKind, Listener};

/// A durable key-value backend.
///
/// Backends are **opaque record stores**. They map string keys to byte
/// values. mirrorkv owns the meaning of those bytes - backends do not know
/// that the value under `"store"` is a serialized keyspace.
///
/// # Invariants
///
/// - `get` returns exactly the bytes of the last successful `set` for that key
/// - A failed `set` leaves the previous value in place
/// - After `close`, every operation fails with [`crate::StorageError::Closed`]
/// - Backend-level failures are also emitted as [`EventKind::Error`] events
///
/// # Implementors
///
/// - [`super::FileBackend`] - Durable single-file storage
/// - [`super::InMemoryBackend`] - For testing
pub trait KvBackend: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or the read fails.
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Durably stores `value` under `key`.
    ///
    /// After this returns successfully the value survives process
    /// termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or the write fails.
    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Closes the backend, flushing anything still pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails or the backend is
    /// already closed.
    fn close(&mut self) -> StorageResult<()>;

    /// Registers `listener` for events of the given kind.
    fn add_listener(&mut self, kind: EventKind, listener: Listener);
}

/// Creates backend handles from a location string.
///
/// The location is the scheme-less part of a store address, for example a
/// file path for [`super::FileConnector`].
pub trait Connector: Send + Sync {
    /// The backend type produced by this connector.
    type Backend: KvBackend;

    /// Opens a new backend handle for `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    fn connect(&self, location: &str) -> StorageResult<Self::Backend>;
}
