//! Injectable log sink.
//!
//! A store logs through a [`StoreLogger`] it was given at construction.
//! The default, [`TracingLogger`], forwards to `tracing`. The sink can be
//! replaced at runtime; listeners registered on the backend see the new
//! sink immediately because they hold the same [`SharedLogger`] slot.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// A destination for store log messages.
pub trait StoreLogger: Send + Sync {
    /// Records `message` about the store named `store`.
    fn log(&self, level: Level, store: &str, message: &str);
}

/// Forwards store messages to `tracing`, tagged with a `store` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StoreLogger for TracingLogger {
    fn log(&self, level: Level, store: &str, message: &str) {
        if level == Level::ERROR {
            tracing::error!(store, "{message}");
        } else if level == Level::WARN {
            tracing::warn!(store, "{message}");
        } else if level == Level::INFO {
            tracing::info!(store, "{message}");
        } else if level == Level::DEBUG {
            tracing::debug!(store, "{message}");
        } else {
            tracing::trace!(store, "{message}");
        }
    }
}

/// A replaceable logger slot shared between a store and its listeners.
#[derive(Clone)]
pub struct SharedLogger {
    slot: Arc<RwLock<Arc<dyn StoreLogger>>>,
}

impl SharedLogger {
    /// Creates a slot holding `logger`.
    pub fn new(logger: Arc<dyn StoreLogger>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(logger)),
        }
    }

    /// Installs `logger` and returns the one it replaced.
    pub fn replace(&self, logger: Arc<dyn StoreLogger>) -> Arc<dyn StoreLogger> {
        std::mem::replace(&mut *self.slot.write(), logger)
    }

    /// Returns the logger currently installed.
    #[must_use]
    pub fn current(&self) -> Arc<dyn StoreLogger> {
        Arc::clone(&self.slot.read())
    }

    /// Logs through the current logger.
    pub fn log(&self, level: Level, store: &str, message: &str) {
        // Clone out first so a logger may call `replace` without deadlocking.
        let logger = self.current();
        logger.log(level, store, message);
    }
}

impl Default for SharedLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl fmt::Debug for SharedLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLogger").finish_non_exhaustive()
    }
}
