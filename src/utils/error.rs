use crate::models::ContactKind;
use std::fmt;
use thiserror::Error;

/// Pipeline stage at which a payload was rejected as malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStage {
    Decompression,
    Delimiters,
    TailRegion,
}

impl fmt::Display for PayloadStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PayloadStage::Decompression => write!(f, "decompression"),
            PayloadStage::Delimiters => write!(f, "delimiter scan"),
            PayloadStage::TailRegion => write!(f, "tail region"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SecureQrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed payload during {stage}: {reason}")]
    MalformedPayload { stage: PayloadStage, reason: String },

    #[error("Invalid email/mobile indicator value: {0:?}")]
    InvalidIndicatorValue(String),

    #[error("Failed to parse field '{field}': {reason}")]
    FieldParseError { field: &'static str, reason: String },

    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    #[error("{0} not found in provided data")]
    ContactNotFound(ContactKind),

    #[error("Iteration count {0} out of range, must be in 0-9")]
    IterationCountOutOfRange(u32),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SecureQrError {
    pub(crate) fn malformed(stage: PayloadStage, reason: impl Into<String>) -> Self {
        SecureQrError::MalformedPayload {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn field(field: &'static str, reason: impl Into<String>) -> Self {
        SecureQrError::FieldParseError {
            field,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SecureQrError {
    fn from(err: std::io::Error) -> Self {
        SecureQrError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SecureQrError {
    fn from(err: serde_json::Error) -> Self {
        SecureQrError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SecureQrError>;
