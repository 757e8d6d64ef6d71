//! Cross-store copy commands.

use super::{open, parse_value, JsonStore};
use tracing::info;

/// Copies one key from the store at `source`.
pub fn copy_key(
    store: &mut JsonStore,
    source: &str,
    key: &str,
    default: Option<&str>,
    dev: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let fallback = default.map(parse_value).transpose()?;
    let mut from = open(source, dev)?;

    store.copy_key(&mut from, key, fallback)?;
    info!("copied {key} from {}", from.name());
    from.disconnect()?;
    Ok(())
}

/// Copies every key from the store at `source`.
pub fn copy_from(
    store: &mut JsonStore,
    source: &str,
    wipe: bool,
    dev: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let from = open(source, dev)?;
    let count = from.len()?;

    store.copy_from(&from, wipe)?;
    info!("copied {count} keys from {}", from.name());
    Ok(())
}
