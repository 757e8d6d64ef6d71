//! The write-through cached store.

use crate::address::StoreAddress;
use crate::codec::{decode_mirror, encode_mirror};
use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::logging::{SharedLogger, StoreLogger, TracingLogger};
use crate::transaction::Mutation;
use mirrorkv_storage::{BackendEvent, Connector, EventKind, KvBackend};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Level;

/// In-memory image of a store's keyspace.
pub type Mirror<V> = BTreeMap<String, V>;

/// Backend record holding the serialized mirror.
pub const STORE_KEY: &str = "store";

/// Connection state of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No backend handle; every operation is refused.
    Disconnected,
    /// Backend handle open and mirror loaded.
    Connected,
}

/// A write-through cache over a durable key-value backend.
///
/// `CachedStore` keeps the whole keyspace in memory and serves every read
/// from there. Each mutation is applied to the mirror first and then
/// persisted, as one blob under the `"store"` record. If persistence fails
/// the mirror is restored to exactly what it was before the mutation.
///
/// # Consistency
///
/// Persistence is synchronous: a mutation returns only after the backend
/// has confirmed or rejected the write, so its `Result` is authoritative.
/// `Ok(())` means the mirror is durable; `Err(CoreError::Persistence)`
/// means it has already been rolled back.
///
/// In development mode mutations are applied in memory only and always
/// succeed.
///
/// # Example
///
/// ```rust
/// use mirrorkv_core::{CachedStore, StoreConfig};
/// use mirrorkv_storage::InMemoryBackend;
///
/// let mut store: CachedStore<u32, _> =
///     CachedStore::open("counters", InMemoryBackend::new(), StoreConfig::default())?;
///
/// store.set("visits", 1)?;
/// assert!(store.has("visits")?);
///
/// store.delete("visits")?;
/// assert!(store.get("visits", None).unwrap_err().is_not_found());
/// # Ok::<(), mirrorkv_core::CoreError>(())
/// ```
pub struct CachedStore<V, C: Connector> {
    address: StoreAddress,
    connector: C,
    backend: Option<C::Backend>,
    mirror: Mirror<V>,
    state: ConnectionState,
    config: StoreConfig,
    logger: SharedLogger,
}

impl<V, C> CachedStore<V, C>
where
    V: Serialize + DeserializeOwned + Clone,
    C: Connector,
{
    /// Opens a store at `address`, logging through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, the backend cannot be
    /// opened, or the persisted keyspace cannot be loaded.
    pub fn open(address: &str, connector: C, config: StoreConfig) -> CoreResult<Self> {
        Self::open_with_logger(address, connector, config, Arc::new(TracingLogger))
    }

    /// Opens a store at `address` with a custom log sink.
    ///
    /// The address is normalized (see [`StoreAddress`]), the backend is
    /// connected and the mirror loaded. With `wipe_on_start` the keyspace is
    /// cleared right after loading.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid, connecting or loading
    /// fails, or the start-up wipe cannot be persisted.
    pub fn open_with_logger(
        address: &str,
        connector: C,
        config: StoreConfig,
        logger: Arc<dyn StoreLogger>,
    ) -> CoreResult<Self> {
        let address = StoreAddress::parse(address)?;
        let mut store = Self {
            address,
            connector,
            backend: None,
            mirror: Mirror::new(),
            state: ConnectionState::Disconnected,
            config,
            logger: SharedLogger::new(logger),
        };

        store.connect()?;
        if store.config.wipe_on_start {
            store.clear()?;
        }
        Ok(store)
    }

    /// Opens a fresh backend handle and reloads the mirror.
    ///
    /// Any handle already held is closed first, so at most one is open.
    /// The store is marked connected only after the load completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened or the `"store"`
    /// record cannot be read or decoded. The store is left disconnected.
    pub fn connect(&mut self) -> CoreResult<()> {
        if let Some(mut previous) = self.backend.take() {
            if let Err(err) = previous.close() {
                self.log(Level::DEBUG, &format!("closing previous handle: {err}"));
            }
        }
        self.state = ConnectionState::Disconnected;
        self.mirror.clear();

        let mut backend = match self.connector.connect(self.address.location()) {
            Ok(backend) => backend,
            Err(err) => {
                self.log(Level::ERROR, &format!("connect failed: {err}"));
                return Err(err.into());
            }
        };

        let logger = self.logger.clone();
        let name = self.address.name().to_string();
        backend.add_listener(
            EventKind::Error,
            Arc::new(move |event: &BackendEvent| {
                let message = match &event.key {
                    Some(key) => format!("backend error on {key}: {}", event.message),
                    None => format!("backend error: {}", event.message),
                };
                logger.log(Level::ERROR, &name, &message);
            }),
        );

        let mirror = match load_mirror(&backend) {
            Ok(mirror) => mirror,
            Err(err) => {
                if let Err(close_err) = backend.close() {
                    self.log(Level::DEBUG, &format!("closing failed handle: {close_err}"));
                }
                self.log(Level::ERROR, &format!("load failed: {err}"));
                return Err(err);
            }
        };

        self.log(
            Level::INFO,
            &format!("connected to {} ({} keys)", self.address, mirror.len()),
        );
        self.backend = Some(backend);
        self.mirror = mirror;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Connects unless already connected.
    ///
    /// # Errors
    ///
    /// Returns the error of [`CachedStore::connect`] if a connect was needed
    /// and failed.
    pub fn reconnect(&mut self) -> CoreResult<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.connect()
    }

    /// Closes the backend handle and empties the mirror.
    ///
    /// Waits for the backend to finish closing before returning. A failed
    /// close is logged and otherwise ignored; the handle is released either
    /// way.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if already disconnected.
    pub fn disconnect(&mut self) -> CoreResult<()> {
        self.ensure_connected()?;

        if let Some(mut backend) = self.backend.take() {
            if let Err(err) = backend.close() {
                self.log(Level::WARN, &format!("close failed: {err}"));
            }
        }
        self.mirror.clear();
        self.state = ConnectionState::Disconnected;
        self.log(Level::INFO, "disconnected");
        Ok(())
    }

    /// Returns true if the store is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Returns the connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true if `key` is present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected.
    pub fn has(&self, key: &str) -> CoreResult<bool> {
        self.ensure_connected()?;
        Ok(self.mirror.contains_key(key))
    }

    /// Returns the value under `key`.
    ///
    /// If the key is absent and a `fallback` is given, the fallback is
    /// stored under `key` and returned. Should that store fail, the call
    /// behaves as if no fallback had been given.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected, or
    /// [`CoreError::NotFound`] if the key is absent and no fallback could
    /// be stored.
    pub fn get(&mut self, key: &str, fallback: Option<V>) -> CoreResult<V> {
        self.ensure_connected()?;
        if let Some(value) = self.mirror.get(key) {
            return Ok(value.clone());
        }

        let Some(value) = fallback else {
            return Err(CoreError::not_found(key));
        };
        match self.set(key, value.clone()) {
            Ok(()) => Ok(value),
            Err(err) => {
                self.log(Level::DEBUG, &format!("fallback for {key} not stored: {err}"));
                Err(CoreError::not_found(key))
            }
        }
    }

    /// Returns all keys in order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected.
    pub fn keys(&self) -> CoreResult<Vec<String>> {
        self.ensure_connected()?;
        Ok(self.mirror.keys().cloned().collect())
    }

    /// Returns the number of keys.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected.
    pub fn len(&self) -> CoreResult<usize> {
        self.ensure_connected()?;
        Ok(self.mirror.len())
    }

    /// Returns true if the keyspace is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected.
    pub fn is_empty(&self) -> CoreResult<bool> {
        self.ensure_connected()?;
        Ok(self.mirror.is_empty())
    }

    /// Returns a snapshot of the whole mirror.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected.
    pub fn entries(&self) -> CoreResult<Mirror<V>> {
        self.ensure_connected()?;
        Ok(self.mirror.clone())
    }

    /// Applies `apply` to the mirror as one persisted mutation.
    ///
    /// This is the primitive every other mutation is built on. The mirror
    /// is snapshotted, `apply` runs, and the result is written to the
    /// backend. If the write fails the snapshot is restored and a warning
    /// labelled with `action` is logged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected (`apply` is not
    /// run), [`CoreError::Persistence`] if the write failed, or
    /// [`CoreError::Codec`] if the new mirror cannot be encoded or would not
    /// decode again on load. In both failure cases the mirror was rolled
    /// back.
    pub fn update<F>(&mut self, action: &str, apply: F) -> CoreResult<()>
    where
        F: FnOnce(&mut Mirror<V>),
    {
        self.ensure_connected()?;

        let txn = Mutation::begin(action, &self.mirror);
        apply(&mut self.mirror);

        match self.persist() {
            Ok(()) => {
                txn.commit();
                Ok(())
            }
            Err(err) => {
                txn.rollback(&mut self.mirror);
                self.log(Level::WARN, &format!("{action} rolled back: {err}"));
                Err(match err {
                    CoreError::Storage(source) => CoreError::Persistence {
                        store: self.address.name().to_string(),
                        action: action.to_string(),
                        source,
                    },
                    other => other,
                })
            }
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// See [`CachedStore::update`].
    pub fn set(&mut self, key: &str, value: V) -> CoreResult<()> {
        self.update(&format!("set({key})"), |mirror| {
            mirror.insert(key.to_string(), value);
        })
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the key is absent, otherwise see
    /// [`CachedStore::update`].
    pub fn delete(&mut self, key: &str) -> CoreResult<()> {
        self.ensure_connected()?;
        if !self.mirror.contains_key(key) {
            return Err(CoreError::not_found(key));
        }
        self.update(&format!("delete({key})"), |mirror| {
            mirror.remove(key);
        })
    }

    /// Adds every key of `template` that is not already present.
    ///
    /// Existing keys keep their values. The additions are persisted as one
    /// mutation, so either all of them stick or none do. Returns the number
    /// of keys added.
    ///
    /// # Errors
    ///
    /// See [`CachedStore::update`].
    pub fn reconcile(&mut self, template: &Mirror<V>) -> CoreResult<usize> {
        let mut added = 0;
        self.update("reconcile", |mirror| {
            for (key, value) in template {
                if !mirror.contains_key(key) {
                    mirror.insert(key.clone(), value.clone());
                    added += 1;
                }
            }
        })?;
        Ok(added)
    }

    /// Removes every key.
    ///
    /// # Errors
    ///
    /// See [`CachedStore::update`].
    pub fn clear(&mut self) -> CoreResult<()> {
        self.update("clear", |mirror| mirror.clear())
    }

    /// Copies one key from `other` into this store.
    ///
    /// The value is read with `other.get(key, fallback)`, so a fallback may
    /// be stored in `other` as a side effect.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if either store is disconnected,
    /// [`CoreError::NotFound`] if `other` has no value to give, otherwise
    /// see [`CachedStore::update`].
    pub fn copy_key<C2: Connector>(
        &mut self,
        other: &mut CachedStore<V, C2>,
        key: &str,
        fallback: Option<V>,
    ) -> CoreResult<()> {
        self.ensure_connected()?;
        other.ensure_connected()?;

        let value = other.get(key, fallback)?;
        self.set(key, value)
    }

    /// Copies every key of `other` into this store.
    ///
    /// With `wipe_first` this store is emptied before the copy. The wipe and
    /// the copy are one mutation: on failure neither is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if either store is disconnected,
    /// otherwise see [`CachedStore::update`].
    pub fn copy_from<C2: Connector>(
        &mut self,
        other: &CachedStore<V, C2>,
        wipe_first: bool,
    ) -> CoreResult<()> {
        self.ensure_connected()?;
        other.ensure_connected()?;

        let source = other.mirror.clone();
        let action = if wipe_first {
            format!("copy_from({}, wipe)", other.name())
        } else {
            format!("copy_from({})", other.name())
        };
        self.update(&action, |mirror| {
            if wipe_first {
                mirror.clear();
            }
            mirror.extend(source);
        })
    }

    /// Registers `listener` on the backend's event channel.
    ///
    /// Listeners belong to the current backend handle and are dropped when
    /// the store reconnects.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotConnected`] if disconnected.
    pub fn add_listener<F>(&mut self, kind: EventKind, listener: F) -> CoreResult<()>
    where
        F: Fn(&BackendEvent) + Send + Sync + 'static,
    {
        self.ensure_connected()?;
        let Some(backend) = self.backend.as_mut() else {
            return Err(CoreError::not_connected(self.address.name()));
        };
        backend.add_listener(kind, Arc::new(listener));
        Ok(())
    }

    /// Installs a new log sink and returns the previous one.
    pub fn set_logger(&self, logger: Arc<dyn StoreLogger>) -> Arc<dyn StoreLogger> {
        self.logger.replace(logger)
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn address(&self) -> &StoreAddress {
        &self.address
    }

    /// Returns the human-readable store name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.address.name()
    }

    /// Returns true if mutations are kept in memory only.
    #[must_use]
    pub fn is_development_mode(&self) -> bool {
        self.config.development_mode
    }

    /// Returns the configuration the store was opened with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn ensure_connected(&self) -> CoreResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(CoreError::not_connected(self.address.name()))
        }
    }

    fn persist(&mut self) -> CoreResult<()> {
        if self.config.development_mode {
            return Ok(());
        }

        let bytes = encode_mirror(&self.mirror)?;
        // The record must stay loadable on the next connect.
        decode_mirror::<V>(&bytes)?;
        let Some(backend) = self.backend.as_mut() else {
            return Err(CoreError::not_connected(self.address.name()));
        };
        backend.set(STORE_KEY, &bytes)?;
        Ok(())
    }

    fn log(&self, level: Level, message: &str) {
        self.logger.log(level, self.address.name(), message);
    }
}

impl<V, C: Connector> Drop for CachedStore<V, C> {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            let _ = backend.close();
        }
    }
}

fn load_mirror<V, B>(backend: &B) -> CoreResult<Mirror<V>>
where
    V: DeserializeOwned,
    B: KvBackend,
{
    match backend.get(STORE_KEY)? {
        Some(bytes) => decode_mirror(&bytes),
        None => Ok(Mirror::new()),
    }
}
