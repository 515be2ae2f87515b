use crate::config::ExtractorConfig;
use crate::models::ExtractedSecureQrData;
use crate::processing::*;
use crate::utils::Result;
use log::{debug, info};

/// Runs the whole decode pipeline for one scanned integer.
///
/// Holds only immutable configuration and the image codec, so a single
/// extractor can be shared between threads.
pub struct SecureQrExtractor {
    config: ExtractorConfig,
    codec: Box<dyn ImageCodec>,
}

impl SecureQrExtractor {
    pub fn new() -> Self {
        SecureQrExtractor {
            config: ExtractorConfig::default(),
            codec: Box::new(JpegTranscoder::default()),
        }
    }

    pub fn with_config(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let codec = Box::new(JpegTranscoder::new(config.jpeg_quality));
        Ok(SecureQrExtractor { config, codec })
    }

    /// Replace the default JPEG transcoder with another photograph decoder.
    pub fn with_codec<C: ImageCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Box::new(codec);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Steps 1-3 plus layout: integer to buffer, trim, decompress, locate
    /// delimiters and tail regions.
    pub fn decode_payload(&self, input: &ScannedInteger) -> Result<SecureQrPayload> {
        // Step 1: Fixed-width big-endian buffer
        let buffer = input.to_fixed_bytes();

        // Step 2: Strip the zero padding
        let compressed = PayloadDecompressor::trim_leading_nulls(&buffer);
        debug!("{} compressed bytes after trimming", compressed.len());

        // Step 3: Inflate
        let decompressed =
            PayloadDecompressor::decompress(compressed, self.config.max_decompressed_bytes)?;

        // Step 4/5: Delimiters, indicator and tail layout
        SecureQrPayload::parse(decompressed)
    }

    /// Main extraction function that orchestrates the entire process
    pub fn extract(&self, input: &ScannedInteger) -> Result<ExtractedSecureQrData> {
        let payload = self.decode_payload(input)?;

        let text_data = payload.text_data()?;
        let image = self.codec.decode(payload.image_bytes())?;
        let contact_info = payload.contact_data(text_data.reference_id.iteration_digit());

        info!(
            "Extracted Secure QR record: indicator {}, photo {}x{}",
            payload.indicator().value(),
            image.width(),
            image.height()
        );

        Ok(ExtractedSecureQrData {
            text_data,
            image,
            contact_info,
            signature: payload.signature(),
        })
    }

    /// Parse decimal text and extract.
    pub fn extract_str(&self, text: &str) -> Result<ExtractedSecureQrData> {
        self.extract(&ScannedInteger::from_decimal(text)?)
    }
}

impl Default for SecureQrExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract with default settings from the decimal text read off a QR code.
pub fn extract_data(input: &str) -> Result<ExtractedSecureQrData> {
    SecureQrExtractor::new().extract_str(input)
}
