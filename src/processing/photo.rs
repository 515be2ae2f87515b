use crate::models::Photograph;
use crate::utils::{Result, SecureQrError};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use log::debug;
use std::io::Cursor;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

// Raw codestream (SOC + SIZ markers) and the JP2 signature box
const J2K_CODESTREAM_MAGIC: [u8; 4] = [0xFF, 0x4F, 0xFF, 0x51];
const JP2_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];

/// Decodes the embedded photograph bytes into a `Photograph`.
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Photograph>;
}

/// Default codec. JPEG 2000 photographs, as written by the issuer, go through
/// OpenJPEG; any other raster format the `image` crate understands is read
/// directly. The result is re-encoded as baseline JPEG for transport.
#[derive(Debug, Clone)]
pub struct JpegTranscoder {
    quality: u8,
}

impl JpegTranscoder {
    pub fn new(quality: u8) -> Self {
        JpegTranscoder {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Vec<u8>> {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let mut jpeg = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut jpeg), ImageOutputFormat::Jpeg(self.quality))
            .map_err(|e| SecureQrError::ImageDecodeError(format!("Failed to encode JPEG: {}", e)))?;
        Ok(jpeg)
    }
}

impl Default for JpegTranscoder {
    fn default() -> Self {
        JpegTranscoder::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageCodec for JpegTranscoder {
    fn decode(&self, bytes: &[u8]) -> Result<Photograph> {
        let source = if is_jpeg2000(bytes) {
            decode_jpeg2000(bytes)?
        } else {
            image::load_from_memory(bytes)
                .map_err(|e| SecureQrError::ImageDecodeError(format!("Failed to open image: {}", e)))?
        };
        let jpeg = self.encode_jpeg(&source)?;

        // Hand back the JPEG as it will be seen by whoever receives the data URI
        let image = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
            .map_err(|e| SecureQrError::ImageDecodeError(e.to_string()))?;

        debug!(
            "Transcoded {} byte photograph ({}x{}) to {} byte JPEG",
            bytes.len(),
            image.width(),
            image.height(),
            jpeg.len()
        );
        Ok(Photograph { image, jpeg })
    }
}

pub fn is_jpeg2000(bytes: &[u8]) -> bool {
    bytes.starts_with(&J2K_CODESTREAM_MAGIC) || bytes.starts_with(&JP2_SIGNATURE)
}

// One decoded component, scaled to 8 bits per sample.
struct Plane {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl Plane {
    // Sample at (x, y) of a `width` x `height` grid; subsampled planes are
    // stretched over it.
    fn sample(&self, x: u32, y: u32, width: u32, height: u32) -> u8 {
        let px = u64::from(x) * u64::from(self.width) / u64::from(width);
        let py = u64::from(y) * u64::from(self.height) / u64::from(height);
        let index = py * u64::from(self.width) + px;
        self.samples.get(index as usize).copied().unwrap_or(0)
    }
}

fn scale_to_u8(value: i64, precision: u32) -> u8 {
    let scaled = match precision {
        0 => value,
        p if p > 8 => value >> (p - 8),
        p => value << (8 - p),
    };
    scaled.clamp(0, 255) as u8
}

fn decode_jpeg2000(bytes: &[u8]) -> Result<DynamicImage> {
    let decoded = jpeg2k::Image::from_bytes(bytes).map_err(|e| {
        SecureQrError::ImageDecodeError(format!("Failed to decode JPEG 2000: {}", e))
    })?;

    let planes: Vec<Plane> = decoded
        .components()
        .iter()
        .map(|component| {
            let precision = component.precision() as u32;
            Plane {
                width: component.width() as u32,
                height: component.height() as u32,
                samples: component
                    .data()
                    .iter()
                    .map(|&v| scale_to_u8(v as i64, precision))
                    .collect(),
            }
        })
        .collect();

    let first = planes
        .first()
        .filter(|plane| plane.width > 0 && plane.height > 0)
        .ok_or_else(|| SecureQrError::ImageDecodeError("JPEG 2000 image has no pixels".to_string()))?;
    let (width, height) = (first.width, first.height);

    // Greyscale (with or without alpha) repeats the first plane
    let (r, g, b) = if planes.len() >= 3 {
        (&planes[0], &planes[1], &planes[2])
    } else {
        (first, first, first)
    };

    debug!(
        "Decoded {}x{} JPEG 2000 image with {} component(s)",
        width,
        height,
        planes.len()
    );
    let rgb = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            r.sample(x, y, width, height),
            g.sample(x, y, width, height),
            b.sample(x, y, width, height),
        ])
    });
    Ok(DynamicImage::ImageRgb8(rgb))
}
