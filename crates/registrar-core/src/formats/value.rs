//! Tagged postcard encoding for stored values.
//!
//! Layout: `[FORMAT_TAG][postcard payload]`. The tag lets a future format
//! coexist with values already on disk; today a single tag is accepted.

use crate::error::{Result, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Tag byte for postcard-encoded values.
pub const FORMAT_TAG: u8 = 0x01;

/// Encode a value for storage.
pub fn encode_value<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = vec![FORMAT_TAG];
    let payload = postcard::to_stdvec(value)?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a value read from storage.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    match bytes.split_first() {
        Some((&FORMAT_TAG, payload)) => Ok(postcard::from_bytes(payload)?),
        Some((tag, _)) => Err(StoreError::Encoding(format!(
            "unknown value format tag 0x{tag:02x}"
        ))),
        None => Err(StoreError::Encoding("empty value".to_owned())),
    }
}
