//! Patch encodings.
//!
//! JSON is the textual wire form shared between store instances.
//! `MessagePack` carries the same structure in a compact binary form.

use shadowdb_foundation::{Error, Result};

use crate::patch::Patch;

/// Encodes a patch as JSON text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(patch: &Patch) -> Result<String> {
    serde_json::to_string(patch).map_err(|e| Error::serialization(e.to_string()))
}

/// Decodes a patch from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not a valid patch.
pub fn from_json(text: &str) -> Result<Patch> {
    serde_json::from_str(text).map_err(|e| Error::serialization(e.to_string()))
}

/// Encodes a patch as `MessagePack` bytes.
///
/// Uses named serialization so entries stay maps keyed by field name.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_msgpack(patch: &Patch) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(patch).map_err(|e| Error::serialization(e.to_string()))
}

/// Decodes a patch from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid patch.
pub fn from_msgpack(bytes: &[u8]) -> Result<Patch> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::serialization(e.to_string()))
}
