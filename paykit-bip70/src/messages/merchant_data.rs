//! Merchant data helpers shared by `PaymentDetails` and `Payment`.
//!
//! Merchant data is opaque bytes on the wire. Callers that want structured
//! data store it as JSON through these helpers.

use serde::{de::DeserializeOwned, Serialize};

use crate::Result;

/// Encode a structured value as merchant data bytes.
pub fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// Decode merchant data bytes previously written with [`encode_json`].
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}
