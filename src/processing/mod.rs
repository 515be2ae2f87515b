pub mod compression;
pub mod fields;
pub mod integer;
pub mod payload;
pub mod photo;
pub mod tail;

pub use compression::PayloadDecompressor;
pub use fields::{FieldParser, RawTextFields};
pub use integer::{ScannedInteger, BUFFER_SIZE};
pub use payload::SecureQrPayload;
pub use photo::{ImageCodec, JpegTranscoder};
pub use tail::{TailLayout, TailRegions};
