use crate::utils::{PayloadStage, Result, SecureQrError};
use flate2::read::GzDecoder;
use flate2::{Decompress, FlushDecompress, Status};
use log::debug;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const ZLIB_GROWTH: usize = 16 * 1024;

/// Null trimming and decompression of the scanned buffer.
pub struct PayloadDecompressor;

impl PayloadDecompressor {
    /// Drop the zero bytes left in front of the payload by fixed-width encoding.
    pub fn trim_leading_nulls(buffer: &[u8]) -> &[u8] {
        let start = buffer.iter().position(|&b| b != 0).unwrap_or(buffer.len());
        &buffer[start..]
    }

    /// Inflate the trimmed buffer. The issuer writes a gzip member; a bare
    /// zlib stream is accepted as well. Output beyond `max_output` bytes is
    /// treated as a malformed payload.
    pub fn decompress(data: &[u8], max_output: usize) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(Self::malformed("no data left after trimming leading zero bytes"));
        }

        let payload = if data.starts_with(&GZIP_MAGIC) {
            Self::inflate_gzip(data, max_output)?
        } else {
            debug!("No gzip magic, attempting zlib stream");
            Self::inflate_zlib(data, max_output)?
        };

        debug!("Decompressed {} bytes into {} bytes", data.len(), payload.len());
        Ok(payload)
    }

    // GzDecoder checks the header CRC, the trailer CRC32 and the size field,
    // and fails on a member cut short.
    fn inflate_gzip(data: &[u8], max_output: usize) -> Result<Vec<u8>> {
        let limit = (max_output as u64).saturating_add(1);
        let mut payload = Vec::new();
        GzDecoder::new(data)
            .take(limit)
            .read_to_end(&mut payload)
            .map_err(|e| Self::malformed(format!("invalid gzip member: {}", e)))?;
        Self::check_limit(payload, max_output)
    }

    // The read-side zlib decoder reports a truncated stream as a clean EOF,
    // so the stream end marker is checked on the raw decompressor.
    fn inflate_zlib(data: &[u8], max_output: usize) -> Result<Vec<u8>> {
        let mut decoder = Decompress::new(true);
        let mut payload = Vec::with_capacity(ZLIB_GROWTH.min(max_output.saturating_add(1)));

        loop {
            let consumed = decoder.total_in() as usize;
            let status = decoder
                .decompress_vec(&data[consumed..], &mut payload, FlushDecompress::Finish)
                .map_err(|e| Self::malformed(format!("invalid zlib stream: {}", e)))?;

            if payload.len() > max_output {
                return Self::check_limit(payload, max_output);
            }
            match status {
                Status::StreamEnd => return Ok(payload),
                _ if payload.len() < payload.capacity() => {
                    return Err(Self::malformed("compressed stream ended before its end marker"))
                }
                _ => payload.reserve(ZLIB_GROWTH),
            }
        }
    }

    fn check_limit(payload: Vec<u8>, max_output: usize) -> Result<Vec<u8>> {
        if payload.len() > max_output {
            return Err(Self::malformed(format!(
                "decompressed payload exceeds {} bytes",
                max_output
            )));
        }
        Ok(payload)
    }

    fn malformed(reason: impl Into<String>) -> SecureQrError {
        SecureQrError::malformed(PayloadStage::Decompression, reason)
    }
}
