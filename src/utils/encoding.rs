// ISO-8859-1 helpers. Every byte maps to the code point of the same value,
// which is how the payload's text fields are encoded.
use crate::utils::{Result, SecureQrError};

pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                SecureQrError::InvalidInput(format!(
                    "character {:?} cannot be encoded as ISO-8859-1",
                    c
                ))
            })
        })
        .collect()
}
