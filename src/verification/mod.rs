pub mod contact;
pub mod hashing;

pub use contact::verify_contact_hash;
pub use hashing::{generate_repeated_sha256, MAX_HASH_ITERATIONS};
