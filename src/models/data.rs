use crate::utils::{Result, SecureQrError};
use crate::verification::verify_contact_hash;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use image::DynamicImage;
use serde::{Serialize, Serializer};
use std::fmt;

/// Leading field of the payload: which contact hashes sit in front of the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailMobileIndicator {
    EmailMobileBothAbsent = 0,
    EmailPresentMobileAbsent = 1,
    EmailAbsentMobilePresent = 2,
    EmailMobileBothPresent = 3,
}

impl EmailMobileIndicator {
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(EmailMobileIndicator::EmailMobileBothAbsent),
            1 => Some(EmailMobileIndicator::EmailPresentMobileAbsent),
            2 => Some(EmailMobileIndicator::EmailAbsentMobilePresent),
            3 => Some(EmailMobileIndicator::EmailMobileBothPresent),
            _ => None,
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn is_email_present(&self) -> bool {
        matches!(
            self,
            EmailMobileIndicator::EmailPresentMobileAbsent
                | EmailMobileIndicator::EmailMobileBothPresent
        )
    }

    pub fn is_mobile_present(&self) -> bool {
        matches!(
            self,
            EmailMobileIndicator::EmailAbsentMobilePresent
                | EmailMobileIndicator::EmailMobileBothPresent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    Male,
    Female,
    // Also the fallback for any text that is not recognisably male or female
    Transgender,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Transgender => "Transgender",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceId {
    pub last_four_aadhaar_digits: String,
    #[serde(serialize_with = "serialize_iso_timestamp")]
    pub timestamp: NaiveDateTime,
}

impl ReferenceId {
    /// Last of the four digits; doubles as the contact hash iteration count.
    pub fn iteration_digit(&self) -> u8 {
        self.last_four_aadhaar_digits
            .bytes()
            .last()
            .map(|b| b.saturating_sub(b'0'))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub care_of: String,
    pub district: String,
    pub landmark: String,
    pub house: String,
    pub location: String,
    pub pin_code: String,
    pub post_office: String,
    pub state: String,
    pub street: String,
    pub sub_district: String,
    pub vtc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedTextData {
    pub reference_id: ReferenceId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Mobile,
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContactKind::Email => write!(f, "Email"),
            ContactKind::Mobile => write!(f, "Mobile"),
        }
    }
}

/// Hashed email address or mobile number. A missing hash means the issuer
/// did not embed that contact detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    #[serde(skip)]
    pub kind: ContactKind,
    pub hash: Option<String>,
    #[serde(skip)]
    pub iteration_digit: u8,
}

impl Contact {
    pub fn new(kind: ContactKind, hash: Option<String>, iteration_digit: u8) -> Self {
        Contact {
            kind,
            hash,
            iteration_digit,
        }
    }

    pub fn is_present(&self) -> bool {
        self.hash.is_some()
    }

    /// Checks a claimed email address or mobile number against the stored hash.
    ///
    /// The candidate is hashed exactly as given and compared byte for byte
    /// with the stored lowercase hex digest. Returns `ContactNotFound` when
    /// the payload carried no hash for this contact, and `Ok(false)` when it
    /// did but the candidate does not match.
    pub fn verify(&self, candidate: &str) -> Result<bool> {
        let stored = self
            .hash
            .as_deref()
            .ok_or(SecureQrError::ContactNotFound(self.kind))?;
        verify_contact_hash(stored, candidate, self.iteration_digit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactData {
    pub email: Contact,
    pub mobile: Contact,
}

impl ContactData {
    pub fn is_email_present(&self) -> bool {
        self.email.is_present()
    }

    pub fn is_mobile_present(&self) -> bool {
        self.mobile.is_present()
    }

    pub fn verify_email(&self, email: &str) -> Result<bool> {
        self.email.verify(email)
    }

    pub fn verify_mobile(&self, mobile: &str) -> Result<bool> {
        self.mobile.verify(mobile)
    }
}

/// The embedded photograph, decoded and re-encoded as JPEG for transport.
#[derive(Debug, Clone)]
pub struct Photograph {
    pub image: DynamicImage,
    pub jpeg: Vec<u8>,
}

impl Photograph {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&self.jpeg))
    }
}

impl PartialEq for Photograph {
    fn eq(&self, other: &Self) -> bool {
        self.jpeg == other.jpeg
    }
}

impl Serialize for Photograph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data_uri())
    }
}

/// Trailing 256-byte digital signature. Carried through, never verified here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlock {
    pub bytes: Vec<u8>,
}

impl SignatureBlock {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedSecureQrData {
    pub text_data: ExtractedTextData,
    pub image: Photograph,
    pub contact_info: ContactData,
    #[serde(skip)]
    pub signature: SignatureBlock,
}

impl ExtractedSecureQrData {
    /// Plain key-value form for transport: nested text data, a JPEG data URI
    /// and the contact hashes.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        Ok(rendered?)
    }
}

// ISO-8601 with microseconds, dropping the fraction entirely when it is zero.
fn serialize_iso_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let rendered = if timestamp.nanosecond() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    };
    serializer.serialize_str(&rendered)
}
