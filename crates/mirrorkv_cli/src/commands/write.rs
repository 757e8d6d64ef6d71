//! Write commands.

use super::{parse_value, JsonStore};
use mirrorkv_core::Mirror;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Stores a JSON value under `key`.
pub fn set(store: &mut JsonStore, key: &str, raw: &str) -> Result<(), Box<dyn std::error::Error>> {
    let value = parse_value(raw)?;
    store.set(key, value)?;
    info!("set {key}");
    Ok(())
}

/// Removes `key`.
pub fn delete(store: &mut JsonStore, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    store.delete(key)?;
    info!("deleted {key}");
    Ok(())
}

/// Removes every key.
pub fn clear(store: &mut JsonStore) -> Result<(), Box<dyn std::error::Error>> {
    let count = store.len()?;
    store.clear()?;
    info!("cleared {count} keys");
    Ok(())
}

/// Adds the keys of a JSON object file that the store lacks.
pub fn reconcile(
    store: &mut JsonStore,
    template: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(template)?;
    let template = template_from_json(&text)?;
    let added = store.reconcile(&template)?;
    info!("reconciled {} template keys, {added} added", template.len());
    Ok(())
}

fn template_from_json(text: &str) -> Result<Mirror<Value>, Box<dyn std::error::Error>> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err("template must be a JSON object".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_must_be_object() {
        let template = template_from_json(r#"{"a": 1, "b": {"c": true}}"#).unwrap();
        assert_eq!(template.len(), 2);
        assert_eq!(template["a"], serde_json::json!(1));

        assert!(template_from_json("[1, 2]").is_err());
        assert!(template_from_json("{").is_err());
    }
}
