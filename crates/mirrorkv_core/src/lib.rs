//! # mirrorkv Core
//!
//! Write-through cached key-value store for mirrorkv.
//!
//! This crate provides:
//! - [`CachedStore`], an in-memory mirror of a durable keyspace
//! - Transactional mutations that roll the mirror back when persistence fails
//! - Derived bulk operations: reconcile, clear, copy-key, copy-from
//! - Address normalization and store configuration
//! - An injectable logging sink backed by `tracing`
//!
//! ## Example
//!
//! ```rust
//! use mirrorkv_core::{CachedStore, StoreConfig};
//! use mirrorkv_storage::InMemoryBackend;
//!
//! let mut store: CachedStore<String, _> =
//!     CachedStore::open("settings", InMemoryBackend::new(), StoreConfig::default()).unwrap();
//!
//! store.set("theme", "dark".to_string()).unwrap();
//! assert_eq!(store.get("theme", None).unwrap(), "dark");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod codec;
mod config;
mod error;
mod logging;
mod store;
mod transaction;

pub use address::{StoreAddress, EXTENSION, SCHEME};
pub use codec::{decode_mirror, encode_mirror};
pub use config::{StoreConfig, ENV_MODE_VAR};
pub use error::{CoreError, CoreResult};
pub use logging::{SharedLogger, StoreLogger, TracingLogger};
pub use store::{CachedStore, ConnectionState, Mirror, STORE_KEY};
pub use transaction::{Mutation, MutationState};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
