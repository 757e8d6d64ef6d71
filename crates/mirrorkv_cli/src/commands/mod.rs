//! CLI command implementations.

pub mod copy;
pub mod read;
pub mod write;

use mirrorkv_core::{CachedStore, StoreConfig};
use mirrorkv_storage::FileConnector;
use serde_json::Value;

/// Store type every command works on.
pub type JsonStore = CachedStore<Value, FileConnector>;

/// Opens the store at `address`.
///
/// Development mode is on if `--dev` was given or the environment asks
/// for it.
pub fn open(address: &str, dev: bool) -> Result<JsonStore, Box<dyn std::error::Error>> {
    let env = StoreConfig::from_env();
    let config = StoreConfig::new().development_mode(dev || env.development_mode);
    Ok(CachedStore::open(address, FileConnector, config)?)
}

/// Opens the store at `path`, runs `command` on it, then disconnects.
pub fn with_store<F>(
    path: Option<&str>,
    dev: bool,
    command: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut JsonStore) -> Result<(), Box<dyn std::error::Error>>,
{
    let path = path.ok_or("Store path required (--path)")?;
    let mut store = open(path, dev)?;
    command(&mut store)?;
    store.disconnect()?;
    Ok(())
}

/// Parses a JSON argument.
pub fn parse_value(raw: &str) -> Result<Value, Box<dyn std::error::Error>> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON value {raw:?}: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_value_accepts_json() {
        assert_eq!(parse_value("42").unwrap(), serde_json::json!(42));
        assert_eq!(parse_value(r#"{"a":[1]}"#).unwrap(), serde_json::json!({"a": [1]}));
        assert!(parse_value("not json").is_err());
    }

    #[test]
    fn with_store_requires_path() {
        assert!(with_store(None, false, |_| Ok(())).is_err());
    }

    #[test]
    fn with_store_persists_and_disconnects() {
        let dir = tempdir().unwrap();
        let address = dir.path().join("cli").display().to_string();

        with_store(Some(&address), false, |store| {
            store.set("k", serde_json::json!([1, 2]))?;
            Ok(())
        })
        .unwrap();

        let mut store = open(&address, false).unwrap();
        assert_eq!(store.get("k", None).unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn open_creates_store_file() {
        let dir = tempdir().unwrap();
        let address = dir.path().join("cli").display().to_string();

        let store = open(&address, false).unwrap();
        assert!(store.is_connected());
        assert!(dir.path().join("cli.mirror").exists());
    }
}
