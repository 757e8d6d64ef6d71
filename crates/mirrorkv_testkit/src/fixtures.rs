//! Test fixtures and store helpers.
//!
//! Provides convenience constructors for stores whose backend and log
//! output a test can inspect.

use mirrorkv_core::{CachedStore, Mirror, StoreConfig, StoreLogger};
use mirrorkv_storage::{FileConnector, InMemoryBackend};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::Level;

/// Store over an in-memory backend, with string values.
pub type MemoryStore = CachedStore<String, InMemoryBackend>;

/// A log sink that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

/// One recorded log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: Level,
    /// Store the message was about.
    pub store: String,
    /// Message text.
    pub message: String,
}

impl RecordingLogger {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded message.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Returns the number of messages at `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.records.lock().iter().filter(|r| r.level == level).count()
    }

    /// Returns true if a message at `level` contains `needle`.
    #[must_use]
    pub fn has(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Returns true if a warning contains `needle`.
    #[must_use]
    pub fn has_warning(&self, needle: &str) -> bool {
        self.has(Level::WARN, needle)
    }

    /// Forgets every recorded message.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl StoreLogger for RecordingLogger {
    fn log(&self, level: Level, store: &str, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            store: store.to_string(),
            message: message.to_string(),
        });
    }
}

/// A store together with the handles a test needs to poke at it.
pub struct TestStore {
    /// The store under test.
    pub store: MemoryStore,
    /// Second handle onto the store's backend volume.
    pub backend: InMemoryBackend,
    /// Everything the store logged.
    pub logger: Arc<RecordingLogger>,
}

impl TestStore {
    /// Creates a connected store over a fresh in-memory backend.
    pub fn memory(name: &str) -> Self {
        Self::with_config(name, StoreConfig::default())
    }

    /// Creates a connected store with the given configuration.
    pub fn with_config(name: &str, config: StoreConfig) -> Self {
        Self::on_backend(name, InMemoryBackend::new(), config)
    }

    /// Creates a connected store over an existing backend volume.
    pub fn on_backend(name: &str, backend: InMemoryBackend, config: StoreConfig) -> Self {
        let logger = Arc::new(RecordingLogger::new());
        let store = CachedStore::open_with_logger(name, backend.clone(), config, logger.clone())
            .expect("Failed to open in-memory store");
        Self {
            store,
            backend,
            logger,
        }
    }

    /// Creates a store pre-populated with `entries`.
    pub fn seeded(name: &str, entries: &Mirror<String>) -> Self {
        let mut fixture = Self::memory(name);
        fixture
            .store
            .update("seed", |mirror| mirror.extend(entries.clone()))
            .expect("Failed to seed store");
        fixture
    }
}

impl std::ops::Deref for TestStore {
    type Target = MemoryStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl std::ops::DerefMut for TestStore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store
    }
}

/// A store file in a temporary directory.
pub struct TempStoreFile {
    dir: TempDir,
    name: String,
}

impl TempStoreFile {
    /// Creates a temporary directory for a store called `name`.
    pub fn new(name: &str) -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            name: name.to_string(),
        }
    }

    /// Returns the address to open the store with.
    #[must_use]
    pub fn address(&self) -> String {
        self.dir.path().join(&self.name).display().to_string()
    }

    /// Returns the path of the store file once it exists.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.dir
            .path()
            .join(format!("{}{}", self.name, mirrorkv_core::EXTENSION))
    }

    /// Opens a string-valued store on this file.
    pub fn open(&self, config: StoreConfig) -> CachedStore<String, FileConnector> {
        CachedStore::open(&self.address(), FileConnector, config)
            .expect("Failed to open file store")
    }
}

/// Builds a mirror from string pairs.
pub fn mirror_of(pairs: &[(&str, &str)]) -> Mirror<String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
