#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use std::io::{Cursor, Write};

/// Secure QR integer printed on a real issuer card (indicator 2, JPEG 2000 photo).
pub const ISSUER_SAMPLE: &str = include_str!("../fixtures/issuer_sample.txt");

pub const SAMPLE_MOBILE_HASH: &str =
    "1f31f19afc2bacbd8afb84526ae4da184a2727e8c2b1b6b9a81e4dc6b74d692a";

pub fn sample_fields() -> Vec<String> {
    [
        "890820190305150137123",
        "Penumarthi Venkat",
        "07-05-1987",
        "M",
        "S/O: Pattabhi Rama Rao",
        "East Godavari",
        "Near Siva Temple",
        "4-83",
        "Sctor-2",
        "533016",
        "Aratlakatta",
        "Andhra Pradesh",
        "Main Road",
        "Karapa",
        "Aratlakatta",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn sample_photo() -> Vec<u8> {
    let img = ImageBuffer::from_fn(24, 32, |x, y| Rgb([(x * 10) as u8, (y * 7) as u8, 90u8]));
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .unwrap();
    png
}

pub fn hash_block(hex_digest: &str) -> [u8; 32] {
    let mut block = [0u8; 32];
    hex::decode_to_slice(hex_digest, &mut block).unwrap();
    block
}

/// Assembles a decompressed payload the way the issuer lays it out.
#[derive(Clone)]
pub struct PayloadBuilder {
    pub indicator: String,
    pub fields: Vec<String>,
    pub image: Vec<u8>,
    pub email_hash: Option<[u8; 32]>,
    pub mobile_hash: Option<[u8; 32]>,
    pub signature: Vec<u8>,
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        PayloadBuilder {
            indicator: "2".to_string(),
            fields: sample_fields(),
            image: sample_photo(),
            email_hash: None,
            mobile_hash: Some(hash_block(SAMPLE_MOBILE_HASH)),
            signature: (0..256).map(|i| (255 - i) as u8).collect(),
        }
    }
}

impl PayloadBuilder {
    pub fn payload(&self) -> Vec<u8> {
        let mut data = self.indicator.as_bytes().to_vec();
        data.push(255);
        for field in &self.fields {
            data.extend(field.chars().map(|c| c as u32 as u8));
            data.push(255);
        }
        data.extend_from_slice(&self.image);
        if let Some(hash) = &self.email_hash {
            data.extend_from_slice(hash);
        }
        if let Some(hash) = &self.mobile_hash {
            data.extend_from_slice(hash);
        }
        data.extend_from_slice(&self.signature);
        data
    }

    pub fn compressed(&self) -> Vec<u8> {
        gzip(&self.payload())
    }

    pub fn integer_text(&self) -> String {
        be_bytes_to_decimal(&self.compressed())
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Decimal text of a big-endian magnitude, by repeated division by 10^9.
pub fn be_bytes_to_decimal(bytes: &[u8]) -> String {
    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|&b| b == 0).collect();
    let mut groups: Vec<u32> = Vec::new();

    while !number.is_empty() {
        let mut remainder: u64 = 0;
        let mut quotient = Vec::with_capacity(number.len());
        for &byte in &number {
            let current = remainder * 256 + u64::from(byte);
            let digit = current / 1_000_000_000;
            remainder = current % 1_000_000_000;
            if !(quotient.is_empty() && digit == 0) {
                quotient.push(digit as u8);
            }
        }
        groups.push(remainder as u32);
        number = quotient;
    }

    match groups.split_last() {
        None => "0".to_string(),
        Some((most_significant, rest)) => {
            let mut text = most_significant.to_string();
            for group in rest.iter().rev() {
                text.push_str(&format!("{:09}", group));
            }
            text
        }
    }
}
