//! Read commands.

use super::{parse_value, JsonStore};
use serde_json::Value;

/// Prints the value under `key`, storing `default` first if it is missing.
pub fn get(
    store: &mut JsonStore,
    key: &str,
    default: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fallback = default.map(parse_value).transpose()?;
    let value = store.get(key, fallback)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Succeeds if `key` exists, fails otherwise.
pub fn has(store: &JsonStore, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    if store.has(key)? {
        println!("true");
        Ok(())
    } else {
        Err(format!("key not found: {key}").into())
    }
}

/// Prints every key, or the whole keyspace as a JSON object.
pub fn list(store: &JsonStore, values: bool) -> Result<(), Box<dyn std::error::Error>> {
    if values {
        let object: serde_json::Map<String, Value> = store.entries()?.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
    } else {
        for key in store.keys()? {
            println!("{key}");
        }
    }
    Ok(())
}
