//! Repeated SHA-256 digesting used by the issuer to hash contact details.
//!
//! The first round hashes the ISO-8859-1 bytes of the input; every further
//! round hashes the lowercase hex text of the previous digest.

use crate::utils::{encode_latin1, Result, SecureQrError};
use sha2::{Digest, Sha256};

pub const MAX_HASH_ITERATIONS: u8 = 9;

/// Hash `input` `iterations` times and return the final hex digest.
///
/// An iteration count of 0 is treated as 1. Counts above 9 are rejected with
/// `IterationCountOutOfRange`.
pub fn generate_repeated_sha256(input: &str, iterations: u8) -> Result<String> {
    if iterations > MAX_HASH_ITERATIONS {
        return Err(SecureQrError::IterationCountOutOfRange(u32::from(iterations)));
    }

    let mut digest = hex::encode(Sha256::digest(encode_latin1(input)?));
    for _ in 1..iterations.max(1) {
        digest = hex::encode(Sha256::digest(digest.as_bytes()));
    }
    Ok(digest)
}
