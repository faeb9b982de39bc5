//! Password hashing for user credentials.
//!
//! Uses scrypt (N=16384, r=16, p=1, dkLen=64) with a random 16-byte salt.
//! Stored format: `hex(salt):hex(key)`. Verification derives the key again
//! and compares in constant time.

use log::error;
use rand::RngCore;
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::ApiError;

/// Failure while hashing or verifying a password. Always an internal
/// fault, never caused by the password value itself.
#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        error!("{}", err);
        ApiError::internal("internal credential error")
    }
}

/// Hash a password for storage.
///
/// # Returns
///
/// A string in the format `salt:key` where both parts are hex-encoded.
/// Each call uses a fresh random salt, so hashing the same password twice
/// yields different strings.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt_hex = hex::encode(salt_bytes);

    let key = derive_key(password, &salt_hex)?;
    Ok(format!("{}:{}", salt_hex, hex::encode(key)))
}

/// Verify a password against a hash produced by [`hash_password`].
///
/// Returns `Ok(false)` for a wrong password; `Err` only when the stored
/// hash is malformed or key derivation itself fails.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, PasswordError> {
    let (salt, key_hex) = hash
        .split_once(':')
        .ok_or_else(|| PasswordError("invalid stored hash format".into()))?;

    let expected_key = hex::decode(key_hex)
        .map_err(|e| PasswordError(format!("invalid hex in stored hash: {e}")))?;

    let derived_key = derive_key(password, salt)?;
    Ok(derived_key.ct_eq(expected_key.as_slice()).into())
}

/// Derive a 64-byte key using scrypt. N=16384 (log2 = 14), r=16, p=1.
fn derive_key(password: &str, salt: &str) -> Result<Vec<u8>, PasswordError> {
    let params = Params::new(14, 16, 1, 64)
        .map_err(|e| PasswordError(format!("invalid scrypt params: {e}")))?;

    let mut output = vec![0u8; 64];
    scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut output)
        .map_err(|e| PasswordError(format!("scrypt failed: {e}")))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("my-secret-password").unwrap();

        // Format: 32 hex chars of salt, 128 hex chars of key.
        let (salt, key) = hash.split_once(':').unwrap();
        assert_eq!(salt.len(), 32);
        assert_eq!(key.len(), 128);

        assert!(verify_password(&hash, "my-secret-password").unwrap());
        assert!(!verify_password(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn same_password_hashes_differently_per_call() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password(&hash1, "same-password").unwrap());
        assert!(verify_password(&hash2, "same-password").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("no-colon-here", "password").is_err());
        assert!(verify_password("nothex:nothex", "password").is_err());
    }
}
