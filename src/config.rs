use crate::processing::photo::DEFAULT_JPEG_QUALITY;
use crate::processing::tail::SIGNATURE_LENGTH;
use crate::utils::{Result, SecureQrError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 1024 * 1024;

/// Tunables for the extractor. Every field has a default, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Upper bound on the decompressed payload size.
    pub max_decompressed_bytes: usize,
    /// Quality used when re-encoding the photograph as JPEG (1-100).
    pub jpeg_quality: u8,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExtractorConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: ExtractorConfig = serde_json::from_str(text)
            .map_err(|e| SecureQrError::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            SecureQrError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_decompressed_bytes <= SIGNATURE_LENGTH {
            return Err(SecureQrError::ConfigError(format!(
                "max_decompressed_bytes must exceed the {} byte signature",
                SIGNATURE_LENGTH
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SecureQrError::ConfigError(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_decompressed_bytes, 1024 * 1024);
        assert_eq!(config.jpeg_quality, 90);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ExtractorConfig::from_json(r#"{ "jpeg_quality": 70 }"#).unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.max_decompressed_bytes, DEFAULT_MAX_DECOMPRESSED_BYTES);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for text in [
            r#"{ "jpeg_quality": 0 }"#,
            r#"{ "max_decompressed_bytes": 100 }"#,
            r#"{ "unknown_key": true }"#,
            "not json",
        ] {
            assert!(
                matches!(ExtractorConfig::from_json(text), Err(SecureQrError::ConfigError(_))),
                "accepted {}",
                text
            );
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_decompressed_bytes": 65536 }}"#).unwrap();
        let config = ExtractorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_decompressed_bytes, 65536);

        let missing = ExtractorConfig::from_file(Path::new("/nonexistent/aadhaar-qr.json"));
        assert!(matches!(missing, Err(SecureQrError::ConfigError(_))));
    }
}
