//! SHA-256 helpers shared by the client, the guardrail, and the context gatherer.
//!
//! Artifacts are hashed over their exact on-disk bytes. Callers that hash a
//! value rather than a file go through `canonical_json`, which is also the
//! byte sequence the store writes, so the two views never diverge.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// The canonical byte encoding of an artifact: pretty-printed JSON with a
/// trailing newline.
///
/// Struct fields serialize in declaration order, so repeated calls on the
/// same value are byte-identical.
pub fn canonical_json<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Compare two hex digests, ignoring ASCII case and surrounding whitespace.
pub fn hashes_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
