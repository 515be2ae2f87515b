//! Byte layout of the payload tail.
//!
//! ```text
//! ... D[15] | image bytes | [email hash] | [mobile hash] | signature (256) |
//! ```
//!
//! Which hash blocks exist is decided by the indicator alone; every offset is
//! computed here from the payload length and the position of the 16th
//! delimiter.

use crate::models::EmailMobileIndicator;
use crate::utils::{PayloadStage, Result, SecureQrError};
use std::ops::Range;

pub const SIGNATURE_LENGTH: usize = 256;
pub const HASH_LENGTH: usize = 32;

/// Hash blocks in front of the signature, as distances back from the
/// signature start to the start of each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailLayout {
    pub email_hash_back: Option<usize>,
    pub mobile_hash_back: Option<usize>,
}

impl TailLayout {
    pub fn for_indicator(indicator: EmailMobileIndicator) -> Self {
        match indicator {
            EmailMobileIndicator::EmailMobileBothAbsent => TailLayout {
                email_hash_back: None,
                mobile_hash_back: None,
            },
            EmailMobileIndicator::EmailPresentMobileAbsent => TailLayout {
                email_hash_back: Some(HASH_LENGTH),
                mobile_hash_back: None,
            },
            EmailMobileIndicator::EmailAbsentMobilePresent => TailLayout {
                email_hash_back: None,
                mobile_hash_back: Some(HASH_LENGTH),
            },
            EmailMobileIndicator::EmailMobileBothPresent => TailLayout {
                email_hash_back: Some(2 * HASH_LENGTH),
                mobile_hash_back: Some(HASH_LENGTH),
            },
        }
    }

    /// Bytes taken by hash blocks between the image and the signature.
    pub fn length_to_subtract(&self) -> usize {
        [self.email_hash_back, self.mobile_hash_back]
            .iter()
            .filter(|block| block.is_some())
            .count()
            * HASH_LENGTH
    }

    /// Resolve concrete byte ranges for a payload of `payload_len` bytes
    /// whose image starts at `image_start` (one past the 16th delimiter).
    pub fn resolve(&self, payload_len: usize, image_start: usize) -> Result<TailRegions> {
        let signature_start = payload_len.checked_sub(SIGNATURE_LENGTH).ok_or_else(|| {
            Self::malformed(format!(
                "payload of {} bytes is shorter than the {} byte signature",
                payload_len, SIGNATURE_LENGTH
            ))
        })?;
        let image_end = signature_start
            .checked_sub(self.length_to_subtract())
            .ok_or_else(|| Self::malformed("payload too short for the announced hash blocks"))?;

        if image_end <= image_start {
            return Err(Self::malformed(format!(
                "image region [{}, {}) is empty",
                image_start, image_end
            )));
        }

        let block = |back: usize| signature_start - back..signature_start - back + HASH_LENGTH;
        Ok(TailRegions {
            image: image_start..image_end,
            email_hash: self.email_hash_back.map(block),
            mobile_hash: self.mobile_hash_back.map(block),
            signature: signature_start..payload_len,
        })
    }

    fn malformed(reason: impl Into<String>) -> SecureQrError {
        SecureQrError::malformed(PayloadStage::TailRegion, reason)
    }
}

/// Concrete byte ranges of the tail, all within the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailRegions {
    pub image: Range<usize>,
    pub email_hash: Option<Range<usize>>,
    pub mobile_hash: Option<Range<usize>>,
    pub signature: Range<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEN: usize = 2000;
    const IMAGE_START: usize = 300;

    fn regions(value: u8) -> TailRegions {
        let indicator = EmailMobileIndicator::from_value(value).unwrap();
        TailLayout::for_indicator(indicator)
            .resolve(LEN, IMAGE_START)
            .unwrap()
    }

    #[test]
    fn test_length_to_subtract_per_indicator() {
        let expected = [(0, 0), (1, 32), (2, 32), (3, 64)];
        for (value, length) in expected {
            let indicator = EmailMobileIndicator::from_value(value).unwrap();
            assert_eq!(TailLayout::for_indicator(indicator).length_to_subtract(), length);
        }
    }

    #[test]
    fn test_neither_present() {
        let r = regions(0);
        assert_eq!(r.signature, LEN - 256..LEN);
        assert_eq!(r.email_hash, None);
        assert_eq!(r.mobile_hash, None);
        assert_eq!(r.image, IMAGE_START..LEN - 256);
    }

    #[test]
    fn test_email_only_sits_against_signature() {
        let r = regions(1);
        assert_eq!(r.email_hash, Some(LEN - 288..LEN - 256));
        assert_eq!(r.mobile_hash, None);
        assert_eq!(r.image, IMAGE_START..LEN - 288);
    }

    #[test]
    fn test_mobile_only_sits_against_signature() {
        let r = regions(2);
        assert_eq!(r.email_hash, None);
        assert_eq!(r.mobile_hash, Some(LEN - 288..LEN - 256));
        assert_eq!(r.image, IMAGE_START..LEN - 288);
    }

    #[test]
    fn test_both_present_are_adjacent_blocks() {
        let r = regions(3);
        let email = r.email_hash.unwrap();
        let mobile = r.mobile_hash.unwrap();
        assert_eq!(email, LEN - 320..LEN - 288);
        assert_eq!(mobile, LEN - 288..LEN - 256);
        assert_eq!(email.end, mobile.start);
        assert_eq!(mobile.end, r.signature.start);
        assert_eq!(r.image, IMAGE_START..LEN - 320);
    }

    #[test]
    fn test_short_payloads_never_underflow() {
        let both = TailLayout::for_indicator(EmailMobileIndicator::EmailMobileBothPresent);
        for (len, start) in [(100, 10), (256, 0), (300, 10), (320, 64), (321, 64)] {
            assert!(matches!(
                both.resolve(len, start),
                Err(SecureQrError::MalformedPayload {
                    stage: PayloadStage::TailRegion,
                    ..
                })
            ));
        }
        assert_eq!(both.resolve(330, 5).unwrap().image, 5..10);
    }

    #[test]
    fn test_image_start_past_hash_blocks_is_rejected() {
        let none = TailLayout::for_indicator(EmailMobileIndicator::EmailMobileBothAbsent);
        assert!(none.resolve(1000, 744).is_err());
        assert_eq!(none.resolve(1000, 743).unwrap().image, 743..744);
    }
}
