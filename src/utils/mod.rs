pub mod encoding;
pub mod error;

pub use encoding::{decode_latin1, encode_latin1};
pub use error::{PayloadStage, Result, SecureQrError};
