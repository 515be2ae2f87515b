use crate::utils::{Result, SecureQrError};
use log::debug;
use std::str::FromStr;

/// Width of the big-endian buffer the scanned integer is serialized into.
pub const BUFFER_SIZE: usize = 16 * 1024;

// Largest decimal digit count whose value can still fit in BUFFER_SIZE bytes
// (16384 * 8 * log10(2) rounded up).
const MAX_DECIMAL_DIGITS: usize = 39_457;

// Decimal digits folded into the limbs per step; 10^9 * 2^32 stays below u64::MAX.
const DIGITS_PER_STEP: usize = 9;

/// Non-negative integer read from a Secure QR code, held as a big-endian
/// magnitude without leading zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedInteger {
    magnitude: Vec<u8>,
}

impl ScannedInteger {
    /// Parse decimal text. Surrounding whitespace and a leading `+` are
    /// accepted; signs, fractions, exponents and any other character are not.
    pub fn from_decimal(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(SecureQrError::InvalidInput(
                "expected a non-negative integer, got empty text".to_string(),
            ));
        }
        if digits.starts_with('-') {
            return Err(SecureQrError::InvalidInput(
                "expected a non-negative integer, got a negative value".to_string(),
            ));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(SecureQrError::InvalidInput(format!(
                "passed text cannot be converted to an integer (unexpected {:?})",
                bad
            )));
        }

        let significant = digits.trim_start_matches('0');
        if significant.len() > MAX_DECIMAL_DIGITS {
            return Err(Self::too_large(significant.len()));
        }

        Self::from_be_bytes(&decimal_to_be_bytes(significant))
    }

    /// Build from a big-endian magnitude, e.g. one produced by a big-integer
    /// library. Leading zero bytes are ignored.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let magnitude = bytes[start..].to_vec();
        if magnitude.len() > BUFFER_SIZE {
            return Err(Self::too_large(magnitude.len()));
        }
        Ok(ScannedInteger { magnitude })
    }

    /// Number of significant bytes in the big-endian representation.
    pub fn byte_len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Serialize into exactly `BUFFER_SIZE` bytes, big-endian, zero-padded on the left.
    pub fn to_fixed_bytes(&self) -> Vec<u8> {
        let mut buffer = vec![0u8; BUFFER_SIZE];
        buffer[BUFFER_SIZE - self.magnitude.len()..].copy_from_slice(&self.magnitude);
        debug!(
            "Serialized scanned integer: {} significant bytes in a {} byte buffer",
            self.magnitude.len(),
            BUFFER_SIZE
        );
        buffer
    }

    fn too_large(size: usize) -> SecureQrError {
        SecureQrError::InvalidInput(format!(
            "integer does not fit in {} bytes (needs about {})",
            BUFFER_SIZE, size
        ))
    }
}

impl FromStr for ScannedInteger {
    type Err = SecureQrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_decimal(s)
    }
}

impl From<u64> for ScannedInteger {
    fn from(value: u64) -> Self {
        Self::from(u128::from(value))
    }
}

impl From<u128> for ScannedInteger {
    fn from(value: u128) -> Self {
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        ScannedInteger {
            magnitude: bytes[start..].to_vec(),
        }
    }
}

// Schoolbook base conversion over little-endian u32 limbs. Input must be
// ASCII digits only.
fn decimal_to_be_bytes(digits: &str) -> Vec<u8> {
    let bytes = digits.as_bytes();
    let (head, rest) = bytes.split_at(bytes.len() % DIGITS_PER_STEP);
    let mut limbs: Vec<u32> = Vec::with_capacity(bytes.len() / DIGITS_PER_STEP + 1);

    for chunk in std::iter::once(head)
        .filter(|c| !c.is_empty())
        .chain(rest.chunks(DIGITS_PER_STEP))
    {
        let multiplier = 10u64.pow(chunk.len() as u32);
        let mut carry = chunk
            .iter()
            .fold(0u64, |acc, &d| acc * 10 + u64::from(d - b'0'));
        for limb in limbs.iter_mut() {
            let value = u64::from(*limb) * multiplier + carry;
            *limb = value as u32;
            carry = value >> 32;
        }
        if carry > 0 {
            limbs.push(carry as u32);
        }
    }

    let mut out: Vec<u8> = limbs.iter().rev().flat_map(|l| l.to_be_bytes()).collect();
    let start = out.iter().position(|&b| b != 0).unwrap_or(out.len());
    out.drain(..start);
    out
}
