//! Backend event channel.
//!
//! Backends report what happens to them through events:
//! - `Error` for failures, including ones nobody is waiting on
//! - `Set` after a write has been confirmed durable
//! - `Close` after the handle has been closed
//!
//! Listeners are plain callbacks registered per event kind. They run on the
//! thread that triggered the event and must not panic.
//!
//! # Usage
//!
//! ```rust
//! use mirrorkv_storage::{BackendEvent, EventKind, ListenerSet};
//! use std::sync::Arc;
//!
//! let listeners = ListenerSet::new();
//! listeners.add(EventKind::Error, Arc::new(|event: &BackendEvent| {
//!     eprintln!("backend error: {}", event.message);
//! }));
//! listeners.emit(&BackendEvent::error("disk full"));
//! ```

use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Kind of backend event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A backend operation failed.
    Error,
    /// A record was written durably.
    Set,
    /// The backend was closed.
    Close,
}

impl EventKind {
    /// Returns the stable event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Set => "set",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "set" => Ok(Self::Set),
            "close" => Ok(Self::Close),
            other => Err(format!("unknown backend event: {other}")),
        }
    }
}

/// A single event emitted by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEvent {
    /// Kind of event.
    pub kind: EventKind,
    /// Record key involved, if any.
    pub key: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl BackendEvent {
    /// Creates an error event.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            key: None,
            message: message.into(),
        }
    }

    /// Creates an error event for a specific record.
    pub fn key_error(key: &str, message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            key: Some(key.to_string()),
            message: message.into(),
        }
    }

    /// Creates a set event.
    pub fn set(key: &str, len: usize) -> Self {
        Self {
            kind: EventKind::Set,
            key: Some(key.to_string()),
            message: format!("wrote {len} bytes"),
        }
    }

    /// Creates a close event.
    pub fn close() -> Self {
        Self {
            kind: EventKind::Close,
            key: None,
            message: "backend closed".to_string(),
        }
    }
}

/// Callback invoked for backend events.
pub type Listener = Arc<dyn Fn(&BackendEvent) + Send + Sync>;

/// A set of listeners keyed by event kind.
///
/// The set:
/// - Delivers events in registration order
/// - Invokes callbacks without holding its lock, so a listener may register
///   further listeners
/// - Is thread-safe
#[derive(Default)]
pub struct ListenerSet {
    listeners: RwLock<Vec<(EventKind, Listener)>>,
}

impl ListenerSet {
    /// Creates an empty listener set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one kind of event.
    pub fn add(&self, kind: EventKind, listener: Listener) {
        self.listeners.write().push((kind, listener));
    }

    /// Delivers `event` to every listener registered for its kind.
    pub fn emit(&self, event: &BackendEvent) {
        let matching: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in matching {
            listener(event);
        }
    }

    /// Returns the number of listeners registered for `kind`.
    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Returns the total number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.listeners.write().clear();
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .finish()
    }
}
