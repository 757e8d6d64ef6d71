//! # mirrorkv Storage
//!
//! Key-value backend contract and implementations for mirrorkv.
//!
//! This crate provides the durable layer underneath a `CachedStore`.
//! Backends are **opaque record stores** - they map string keys to byte
//! values and do not interpret what they hold.
//!
//! ## Design Principles
//!
//! - Backends expose four operations: get, set, close, and listener registration
//! - A [`Connector`] creates a backend handle from a location string
//! - Asynchronous failures are reported on the event channel, never by panicking
//! - Must be `Send + Sync` so handles can move between threads
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - Durable single-file record table
//! - [`InMemoryBackend`] - For testing, with fault injection
//!
//! ## Example
//!
//! ```rust
//! use mirrorkv_storage::{KvBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.set("store", b"hello world").unwrap();
//! assert_eq!(backend.get("store").unwrap(), Some(b"hello world".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod events;
mod file;
mod memory;

pub use backend::{Connector, KvBackend};
pub use error::{StorageError, StorageResult};
pub use events::{BackendEvent, EventKind, Listener, ListenerSet};
pub use file::{FileBackend, FileConnector, FILE_MAGIC, FORMAT_VERSION, HEADER_SIZE};
pub use memory::InMemoryBackend;
