pub mod config;
pub mod models;
pub mod processing;
pub mod secure_qr_extractor;
pub mod utils;
pub mod verification;

pub use config::ExtractorConfig;
pub use models::{
    Address, Contact, ContactData, ContactKind, EmailMobileIndicator, ExtractedSecureQrData,
    ExtractedTextData, Gender, Photograph, ReferenceId, SignatureBlock,
};
pub use processing::ScannedInteger;
pub use secure_qr_extractor::{extract_data, SecureQrExtractor};
pub use utils::{Result, SecureQrError};
pub use verification::generate_repeated_sha256;
