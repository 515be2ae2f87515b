use crate::models::{
    Contact, ContactData, ContactKind, EmailMobileIndicator, ExtractedTextData, SignatureBlock,
};
use crate::processing::fields::{find_delimiters, parse_indicator, RawTextFields, NAMED_FIELD_COUNT};
use crate::processing::tail::{TailLayout, TailRegions};
use crate::utils::Result;
use log::debug;

/// A decompressed Secure QR payload with its delimiters and tail located.
///
/// Construction runs the delimiter scan, the indicator decode and the tail
/// arithmetic, so any instance is known to have well-formed regions. Text
/// fields are parsed on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureQrPayload {
    data: Vec<u8>,
    delimiters: Vec<usize>,
    indicator: EmailMobileIndicator,
    regions: TailRegions,
}

impl SecureQrPayload {
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let delimiters = find_delimiters(&data)?;
        let indicator = parse_indicator(&data, &delimiters)?;
        let image_start = delimiters[NAMED_FIELD_COUNT] + 1;
        let regions = TailLayout::for_indicator(indicator).resolve(data.len(), image_start)?;

        debug!(
            "Payload layout: {} bytes, indicator {}, image {:?}, signature {:?}",
            data.len(),
            indicator.value(),
            regions.image,
            regions.signature
        );

        Ok(SecureQrPayload {
            data,
            delimiters,
            indicator,
            regions,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn delimiters(&self) -> &[usize] {
        &self.delimiters
    }

    pub fn indicator(&self) -> EmailMobileIndicator {
        self.indicator
    }

    pub fn regions(&self) -> &TailRegions {
        &self.regions
    }

    pub fn raw_text_fields(&self) -> Result<RawTextFields> {
        RawTextFields::extract(&self.data, &self.delimiters)
    }

    pub fn text_data(&self) -> Result<ExtractedTextData> {
        ExtractedTextData::try_from(self.raw_text_fields()?)
    }

    pub fn image_bytes(&self) -> &[u8] {
        &self.data[self.regions.image.clone()]
    }

    pub fn email_hash(&self) -> Option<String> {
        self.regions
            .email_hash
            .clone()
            .map(|range| hex::encode(&self.data[range]))
    }

    pub fn mobile_hash(&self) -> Option<String> {
        self.regions
            .mobile_hash
            .clone()
            .map(|range| hex::encode(&self.data[range]))
    }

    /// Contact hashes seeded with the last reference-id digit.
    pub fn contact_data(&self, iteration_digit: u8) -> ContactData {
        ContactData {
            email: Contact::new(ContactKind::Email, self.email_hash(), iteration_digit),
            mobile: Contact::new(ContactKind::Mobile, self.mobile_hash(), iteration_digit),
        }
    }

    pub fn signature(&self) -> SignatureBlock {
        SignatureBlock {
            bytes: self.data[self.regions.signature.clone()].to_vec(),
        }
    }

    /// Everything in front of the signature; the bytes the signature covers.
    pub fn signed_data(&self) -> &[u8] {
        &self.data[..self.regions.signature.start]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::fields::DELIMITER;
    use crate::processing::tail::{HASH_LENGTH, SIGNATURE_LENGTH};
    use crate::utils::{PayloadStage, SecureQrError};

    const MOBILE_HASH: &str = "1f31f19afc2bacbd8afb84526ae4da184a2727e8c2b1b6b9a81e4dc6b74d692a";

    fn build(indicator: &str, email: Option<[u8; 32]>, mobile: Option<[u8; 32]>) -> Vec<u8> {
        let mut data = indicator.as_bytes().to_vec();
        data.push(DELIMITER);
        data.extend_from_slice(b"890820190305150137123");
        data.push(DELIMITER);
        for field in ["Name", "07-05-1987", "F"] {
            data.extend_from_slice(field.as_bytes());
            data.push(DELIMITER);
        }
        for _ in 0..11 {
            data.extend_from_slice(b"addr");
            data.push(DELIMITER);
        }
        // image bytes may contain the delimiter value themselves
        data.extend_from_slice(&[1, 2, DELIMITER, 4, 5]);
        if let Some(hash) = email {
            data.extend_from_slice(&hash);
        }
        if let Some(hash) = mobile {
            data.extend_from_slice(&hash);
        }
        data.extend((0..SIGNATURE_LENGTH).map(|i| i as u8));
        data
    }

    fn mobile_block() -> [u8; 32] {
        let mut block = [0u8; HASH_LENGTH];
        hex::decode_to_slice(MOBILE_HASH, &mut block).unwrap();
        block
    }

    #[test]
    fn test_mobile_only_payload() {
        let payload = SecureQrPayload::parse(build("2", None, Some(mobile_block()))).unwrap();
        assert_eq!(payload.indicator(), EmailMobileIndicator::EmailAbsentMobilePresent);
        assert_eq!(payload.mobile_hash().as_deref(), Some(MOBILE_HASH));
        assert_eq!(payload.email_hash(), None);
        assert_eq!(payload.image_bytes(), &[1, 2, DELIMITER, 4, 5]);
        assert!(payload.delimiters().len() > 16);
    }

    #[test]
    fn test_both_hashes_in_order() {
        let email = [0xAA; 32];
        let payload = SecureQrPayload::parse(build("3", Some(email), Some(mobile_block()))).unwrap();
        assert_eq!(payload.email_hash(), Some("aa".repeat(32)));
        assert_eq!(payload.mobile_hash().as_deref(), Some(MOBILE_HASH));
        assert_eq!(payload.image_bytes().len(), 5);
    }

    #[test]
    fn test_signature_and_signed_data_partition_payload() {
        let data = build("0", None, None);
        let payload = SecureQrPayload::parse(data.clone()).unwrap();
        let signature = payload.signature();
        assert_eq!(signature.bytes.len(), SIGNATURE_LENGTH);
        assert_eq!(signature.bytes[255], 255);
        assert_eq!(payload.signed_data().len() + SIGNATURE_LENGTH, data.len());
        assert_eq!([payload.signed_data(), &signature.bytes[..]].concat(), data);
    }

    #[test]
    fn test_contact_data_follows_indicator() {
        let payload = SecureQrPayload::parse(build("1", Some([0x11; 32]), None)).unwrap();
        let contacts = payload.contact_data(8);
        assert!(contacts.is_email_present());
        assert!(!contacts.is_mobile_present());
        assert_eq!(contacts.email.iteration_digit, 8);
        assert!(matches!(
            contacts.verify_mobile("9999999999"),
            Err(SecureQrError::ContactNotFound(ContactKind::Mobile))
        ));
    }

    #[test]
    fn test_text_data_parsed_on_demand() {
        let payload = SecureQrPayload::parse(build("0", None, None)).unwrap();
        let text = payload.text_data().unwrap();
        assert_eq!(text.name, "Name");
        assert_eq!(text.address.vtc, "addr");
    }

    #[test]
    fn test_indicator_claiming_missing_hashes_leaves_no_image() {
        // indicator 3 but the tail only holds the signature and 5 image bytes
        let data = build("3", None, None);
        assert!(matches!(
            SecureQrPayload::parse(data),
            Err(SecureQrError::MalformedPayload {
                stage: PayloadStage::TailRegion,
                ..
            })
        ));
    }
}
