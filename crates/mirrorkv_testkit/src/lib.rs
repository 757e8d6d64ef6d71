//! # mirrorkv Testkit
//!
//! Test utilities for mirrorkv.
//!
//! This crate provides:
//! - Store fixtures over in-memory and file backends
//! - A recording log sink for asserting on warnings
//! - Property-based test generators using proptest
//!
//! The property and scenario suites for `CachedStore` live in this
//! crate's `tests/` directory.
//!
//! ## Usage
//!
//! ```rust
//! use mirrorkv_testkit::prelude::*;
//!
//! let mut fixture = TestStore::memory("scratch");
//! fixture.store.set("k", "v".to_string()).unwrap();
//!
//! fixture.backend.fail_writes(true);
//! assert!(fixture.store.set("k", "w".to_string()).is_err());
//! assert!(fixture.logger.has_warning("rolled back"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
