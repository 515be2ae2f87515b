// Delimiter scanning and typed parsing of the payload's text fields
use crate::models::{Address, EmailMobileIndicator, ExtractedTextData, Gender, ReferenceId};
use crate::utils::{decode_latin1, PayloadStage, Result, SecureQrError};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

pub const DELIMITER: u8 = 255;

/// Text fields following the indicator, in payload order.
pub const NAMED_FIELD_COUNT: usize = 15;

/// One delimiter per named field plus the one closing the indicator; the
/// last of them marks the start of the image.
pub const MIN_DELIMITERS: usize = NAMED_FIELD_COUNT + 1;

const DATE_OF_BIRTH_FORMAT: &str = "%d-%m-%Y";

lazy_static! {
    // 4 digits, then YYYYMMDDHHMMSS, then 1-6 fractional second digits
    static ref REFERENCE_ID_PATTERN: Regex = Regex::new(
        r"^([0-9]{4})([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{1,6})$"
    )
    .unwrap();
    static ref MALE_PATTERN: Regex = Regex::new(r"(?i)^(m|male)").unwrap();
    static ref FEMALE_PATTERN: Regex = Regex::new(r"(?i)^(f|female)").unwrap();
}

/// Positions of every delimiter byte, in order. Fails unless at least
/// `MIN_DELIMITERS` are present.
pub fn find_delimiters(data: &[u8]) -> Result<Vec<usize>> {
    let delimiters: Vec<usize> = data
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == DELIMITER)
        .map(|(index, _)| index)
        .collect();

    if delimiters.len() < MIN_DELIMITERS {
        return Err(SecureQrError::malformed(
            PayloadStage::Delimiters,
            format!(
                "found {} delimiters, expected at least {}",
                delimiters.len(),
                MIN_DELIMITERS
            ),
        ));
    }
    debug!("Found {} delimiter bytes", delimiters.len());
    Ok(delimiters)
}

/// Decode the leading indicator field `[0, D[0])`.
pub fn parse_indicator(data: &[u8], delimiters: &[usize]) -> Result<EmailMobileIndicator> {
    let end = delimiters.first().copied().unwrap_or(data.len());
    let raw = decode_latin1(&data[..end]);
    let value = raw
        .trim()
        .parse::<u8>()
        .map_err(|_| SecureQrError::InvalidIndicatorValue(raw.clone()))?;
    EmailMobileIndicator::from_value(value).ok_or(SecureQrError::InvalidIndicatorValue(raw))
}

/// The 15 named text fields exactly as they appear in the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTextFields {
    pub reference_id: String,
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub care_of: String,
    pub district: String,
    pub landmark: String,
    pub house: String,
    pub location: String,
    pub pincode: String,
    pub post_office: String,
    pub state: String,
    pub street: String,
    pub sub_district: String,
    pub vtc: String,
}

impl RawTextFields {
    /// Slice out the spans `[D[i-1]+1, D[i])` for `i` in `1..=15`.
    pub fn extract(data: &[u8], delimiters: &[usize]) -> Result<Self> {
        if delimiters.len() < MIN_DELIMITERS {
            return Err(SecureQrError::malformed(
                PayloadStage::Delimiters,
                "not enough delimiters for the named fields",
            ));
        }
        let field = |i: usize| decode_latin1(&data[delimiters[i - 1] + 1..delimiters[i]]);

        Ok(RawTextFields {
            reference_id: field(1),
            name: field(2),
            dob: field(3),
            gender: field(4),
            care_of: field(5),
            district: field(6),
            landmark: field(7),
            house: field(8),
            location: field(9),
            pincode: field(10),
            post_office: field(11),
            state: field(12),
            street: field(13),
            sub_district: field(14),
            vtc: field(15),
        })
    }
}

impl TryFrom<RawTextFields> for ExtractedTextData {
    type Error = SecureQrError;

    fn try_from(raw: RawTextFields) -> Result<Self> {
        Ok(ExtractedTextData {
            reference_id: FieldParser::parse_reference_id(&raw.reference_id)?,
            name: raw.name,
            date_of_birth: FieldParser::parse_date_of_birth(&raw.dob)?,
            gender: FieldParser::classify_gender(&raw.gender),
            address: Address {
                care_of: raw.care_of,
                district: raw.district,
                landmark: raw.landmark,
                house: raw.house,
                location: raw.location,
                pin_code: raw.pincode,
                post_office: raw.post_office,
                state: raw.state,
                street: raw.street,
                sub_district: raw.sub_district,
                vtc: raw.vtc,
            },
        })
    }
}

/// Typed sub-parses of individual text fields.
pub struct FieldParser;

impl FieldParser {
    /// Split `DDDDYYYYMMDDHHMMSSf..` into the last four identity digits and
    /// the generation timestamp. Fractional digits are right-padded to
    /// microseconds, so `123` reads as `.123`.
    pub fn parse_reference_id(text: &str) -> Result<ReferenceId> {
        let captures = REFERENCE_ID_PATTERN.captures(text).ok_or_else(|| {
            SecureQrError::field(
                "reference_id",
                "expected 4 digits followed by a YYYYMMDDHHMMSSffffff timestamp",
            )
        })?;
        let number = |i: usize| -> u32 { captures[i].parse().unwrap_or(0) };

        let fraction = format!("{:0<6}", &captures[8]);
        let micros: u32 = fraction
            .parse()
            .map_err(|_| SecureQrError::field("reference_id", "invalid fractional seconds"))?;

        let timestamp = NaiveDate::from_ymd_opt(number(2) as i32, number(3), number(4))
            .and_then(|date| date.and_hms_micro_opt(number(5), number(6), number(7), micros))
            .ok_or_else(|| {
                SecureQrError::field("reference_id", "timestamp is not a valid calendar time")
            })?;

        Ok(ReferenceId {
            last_four_aadhaar_digits: captures[1].to_string(),
            timestamp,
        })
    }

    pub fn parse_date_of_birth(text: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), DATE_OF_BIRTH_FORMAT).map_err(|e| {
            SecureQrError::field("date_of_birth", format!("expected DD-MM-YYYY ({})", e))
        })
    }

    /// Prefix match, case-insensitive. Anything that does not start like
    /// male or female falls back to `Transgender`.
    pub fn classify_gender(text: &str) -> Gender {
        if MALE_PATTERN.is_match(text) {
            Gender::Male
        } else if FEMALE_PATTERN.is_match(text) {
            Gender::Female
        } else {
            Gender::Transgender
        }
    }
}
