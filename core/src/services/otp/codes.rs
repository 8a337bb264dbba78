//! OTP code generation and hashing

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};

/// Bytes of randomness in a per-record salt
pub const SALT_LEN: usize = 16;

/// Generate a numeric code of `length` digits
///
/// Each digit is drawn independently and uniformly from 0-9 using the OS
/// CSPRNG, so leading zeros are as likely as any other digit.
pub fn generate_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Fresh random salt, hex encoded
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 of `salt || code`
pub fn hash_code(code: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a submitted code against a stored digest in constant time
pub fn code_matches(code: &str, salt: &str, stored_hash: &str) -> bool {
    let computed = hash_code(code, salt);
    constant_time_eq(computed.as_bytes(), stored_hash.as_bytes())
}

/// Whether a submission has the shape of a code: exactly `length` ASCII digits
pub fn is_well_formed(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| b.is_ascii_digit())
}
