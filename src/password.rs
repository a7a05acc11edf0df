//! Password hashing for local accounts.
//!
//! Hashes are PBKDF2-HMAC-SHA256 digests stored as lowercase hex alongside a
//! per-user random salt. The salt is stored hex-encoded and its hex text is
//! what gets fed to PBKDF2, so a stored `(hash, salt)` pair is self-contained.
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

/// PBKDF2 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Raw salt length in bytes (hex-encoded length is twice this).
pub const SALT_LEN: usize = 16;

/// Digest length in bytes (SHA-256 output size).
const HASH_LEN: usize = 32;

/// Generate a fresh random salt from the OS RNG, hex-encoded.
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    hex::encode(salt)
}

/// Derive the hex-encoded password hash for `password` under `salt`.
pub fn hash_password(password: &str, salt: &str) -> String {
    hex::encode(derive(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS))
}

/// Check `password` against a stored hash and salt.
///
/// A stored hash that is not valid hex, or has the wrong length, never
/// verifies. Digest comparison is constant-time.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let Ok(expected) = hex::decode(hash) else {
        return false;
    };
    if expected.len() != HASH_LEN {
        return false;
    }
    let computed = derive(password.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS);
    constant_time_eq(&computed, &expected)
}

fn derive(password: &[u8], salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut out);
    out
}

/// Constant-time comparison to prevent timing side channels.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
