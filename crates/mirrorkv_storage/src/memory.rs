//! In-memory backend for testing.

use crate::backend::{Connector, KvBackend};
use crate::error::{StorageError, StorageResult};
use crate::events::{BackendEvent, EventKind, Listener, ListenerSet};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Volume {
    records: RwLock<HashMap<String, Vec<u8>>>,
    listeners: ListenerSet,
    closed: AtomicBool,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    fail_close: AtomicBool,
    writes: AtomicUsize,
}

/// An in-memory backend.
///
/// Every clone is a handle onto the same volume, so a test can keep one
/// clone to inspect records or inject faults while a store owns another.
/// Connecting (through [`Connector`]) reopens the volume: records survive,
/// listeners from the previous connection are dropped.
///
/// This backend is suitable for:
/// - Unit tests
/// - Failure-injection tests of rollback behavior
/// - Ephemeral stores that don't need persistence
///
/// # Example
///
/// ```rust
/// use mirrorkv_storage::{KvBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let handle = backend.clone();
///
/// handle.fail_writes(true);
/// assert!(backend.set("store", b"data").is_err());
/// assert_eq!(handle.record("store"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    volume: Arc<Volume>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the record stored under `key`.
    #[must_use]
    pub fn record(&self, key: &str) -> Option<Vec<u8>> {
        self.volume.records.read().get(key).cloned()
    }

    /// Stores a record directly, bypassing fault injection and events.
    ///
    /// Useful for seeding recovery scenarios.
    pub fn put_record(&self, key: &str, value: Vec<u8>) {
        self.volume.records.write().insert(key.to_string(), value);
    }

    /// Makes every subsequent `set` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.volume.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.volume.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `close` fail (or succeed again).
    pub fn fail_close(&self, fail: bool) {
        self.volume.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Emits an error event as if the backend had failed on its own.
    pub fn emit_error(&self, message: &str) {
        self.volume.listeners.emit(&BackendEvent::error(message));
    }

    /// Returns the number of successful writes since creation.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.volume.writes.load(Ordering::SeqCst)
    }

    /// Returns true if the current connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.volume.closed.load(Ordering::SeqCst)
    }

    /// Returns the number of listeners registered on the current connection.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.volume.listeners.len()
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_closed() {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        if self.volume.fail_reads.load(Ordering::SeqCst) {
            let err = StorageError::injected("read failure");
            self.volume
                .listeners
                .emit(&BackendEvent::key_error(key, err.to_string()));
            return Err(err);
        }
        Ok(self.record(key))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.ensure_open()?;
        if self.volume.fail_writes.load(Ordering::SeqCst) {
            let err = StorageError::injected("write failure");
            self.volume
                .listeners
                .emit(&BackendEvent::key_error(key, err.to_string()));
            return Err(err);
        }

        self.put_record(key, value.to_vec());
        self.volume.writes.fetch_add(1, Ordering::SeqCst);
        self.volume.listeners.emit(&BackendEvent::set(key, value.len()));
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.ensure_open()?;
        self.volume.closed.store(true, Ordering::SeqCst);
        if self.volume.fail_close.load(Ordering::SeqCst) {
            return Err(StorageError::injected("close failure"));
        }
        self.volume.listeners.emit(&BackendEvent::close());
        Ok(())
    }

    fn add_listener(&mut self, kind: EventKind, listener: Listener) {
        self.volume.listeners.add(kind, listener);
    }
}

impl Connector for InMemoryBackend {
    type Backend = InMemoryBackend;

    fn connect(&self, _location: &str) -> StorageResult<InMemoryBackend> {
        self.volume.listeners.clear();
        self.volume.closed.store(false, Ordering::SeqCst);
        Ok(self.clone())
    }
}
