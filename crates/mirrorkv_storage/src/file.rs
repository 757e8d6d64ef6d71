//! File-based backend for durable storage.

use crate::backend::{Connector, KvBackend};
use crate::error::{StorageError, StorageResult};
use crate::events::{BackendEvent, EventKind, Listener, ListenerSet};
use ciborium::value::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Magic bytes at the start of every store file.
pub const FILE_MAGIC: [u8; 4] = *b"MKV1";

/// Current on-disk format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed file header in bytes.
///
/// Layout: magic (4) | version u16 LE (2) | reserved (2) | payload length u32 LE (4).
pub const HEADER_SIZE: usize = 12;

/// A durable single-file backend.
///
/// All records live in one file: a fixed header followed by a CBOR map of
/// key to byte string. The whole table is kept in memory and rewritten on
/// every `set`.
///
/// # Durability
///
/// Each write goes to a sibling `*.tmp` file, is synced with
/// `File::sync_all()`, and is then renamed over the store file. A crash at
/// any point leaves either the old table or the new one, never a mix.
///
/// # Example
///
/// ```no_run
/// use mirrorkv_storage::{KvBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("settings.mirror")).unwrap();
/// backend.set("store", b"persistent data").unwrap();
/// backend.close().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    records: BTreeMap<String, Vec<u8>>,
    listeners: ListenerSet,
    closed: bool,
}

impl FileBackend {
    /// Opens or creates a store file at the given path.
    ///
    /// Parent directories are created if needed. A missing or empty file is
    /// initialized with an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or read, or if its
    /// contents are not a valid store file.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let mut backend = Self {
            path: path.to_path_buf(),
            records: BTreeMap::new(),
            listeners: ListenerSet::new(),
            closed: false,
        };

        if bytes.is_empty() {
            backend.write_table()?;
        } else {
            backend.records = decode_table(&bytes)?;
        }

        Ok(backend)
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of records in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    fn write_table(&self) -> StorageResult<()> {
        let bytes = encode_table(&self.records)?;
        let tmp = self.temp_path();

        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            // Best effort; the previous table is untouched either way.
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.ensure_open()?;

        let previous = self.records.insert(key.to_string(), value.to_vec());
        if let Err(err) = self.write_table() {
            match previous {
                Some(old) => self.records.insert(key.to_string(), old),
                None => self.records.remove(key),
            };
            self.listeners
                .emit(&BackendEvent::key_error(key, err.to_string()));
            return Err(err);
        }

        self.listeners.emit(&BackendEvent::set(key, value.len()));
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.ensure_open()?;
        self.closed = true;
        self.listeners.emit(&BackendEvent::close());
        Ok(())
    }

    fn add_listener(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.add(kind, listener);
    }
}

/// Connects store locations to [`FileBackend`] files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConnector;

impl Connector for FileConnector {
    type Backend = FileBackend;

    fn connect(&self, location: &str) -> StorageResult<FileBackend> {
        FileBackend::open(Path::new(location))
    }
}

fn encode_table(records: &BTreeMap<String, Vec<u8>>) -> StorageResult<Vec<u8>> {
    let table: BTreeMap<&str, Value> = records
        .iter()
        .map(|(key, value)| (key.as_str(), Value::Bytes(value.clone())))
        .collect();

    let mut payload = Vec::new();
    ciborium::ser::into_writer(&table, &mut payload)
        .map_err(|e| StorageError::Encoding(e.to_string()))?;

    let len = u32::try_from(payload.len())
        .map_err(|_| StorageError::Encoding(format!("table too large: {} bytes", payload.len())))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&FILE_MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 2]);
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode_table(bytes: &[u8]) -> StorageResult<BTreeMap<String, Vec<u8>>> {
    if bytes.len() < HEADER_SIZE {
        return Err(StorageError::corrupted(format!(
            "file too short for header: {} bytes",
            bytes.len()
        )));
    }
    if bytes[0..4] != FILE_MAGIC {
        return Err(StorageError::corrupted("bad magic"));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(StorageError::corrupted(format!(
            "unsupported format version {version}"
        )));
    }

    let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != len {
        return Err(StorageError::corrupted(format!(
            "payload length mismatch: header says {len}, found {}",
            payload.len()
        )));
    }

    let table: BTreeMap<String, Value> = ciborium::de::from_reader(payload)
        .map_err(|e| StorageError::corrupted(format!("invalid table: {e}")))?;

    table
        .into_iter()
        .map(|(key, value)| match value {
            Value::Bytes(bytes) => Ok((key, bytes)),
            _ => Err(StorageError::corrupted(format!(
                "record {key} is not a byte string"
            ))),
        })
        .collect()
}
