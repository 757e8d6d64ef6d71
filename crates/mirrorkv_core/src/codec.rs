//! Mirror serialization.
//!
//! The whole keyspace is persisted as one CBOR map under a single backend
//! record. Keys are sorted, so equal mirrors encode to equal bytes.

use crate::error::{CoreError, CoreResult};
use crate::store::Mirror;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes a mirror into the bytes stored under the `"store"` record.
///
/// # Errors
///
/// Returns [`CoreError::Codec`] if a value cannot be serialized.
pub fn encode_mirror<V: Serialize>(mirror: &Mirror<V>) -> CoreResult<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(mirror, &mut bytes)
        .map_err(|e| CoreError::codec(format!("encode failed: {e}")))?;
    Ok(bytes)
}

/// Decodes a persisted `"store"` record back into a mirror.
///
/// # Errors
///
/// Returns [`CoreError::Codec`] if the bytes are not a map of the
/// expected value type.
pub fn decode_mirror<V: DeserializeOwned>(bytes: &[u8]) -> CoreResult<Mirror<V>> {
    ciborium::de::from_reader(bytes).map_err(|e| CoreError::codec(format!("decode failed: {e}")))
}
