use crate::utils::Result;
use crate::verification::generate_repeated_sha256;
use log::debug;

/// Shared check behind email and mobile verification: hash the candidate with
/// the reference-id iteration seed and compare with the stored lowercase hex
/// digest. The comparison is exact.
pub fn verify_contact_hash(stored_hash: &str, candidate: &str, iterations: u8) -> Result<bool> {
    let generated = generate_repeated_sha256(candidate, iterations)?;
    let matches = generated == stored_hash;
    debug!("Contact hash verification with {} round(s): match={}", iterations.max(1), matches);
    Ok(matches)
}
