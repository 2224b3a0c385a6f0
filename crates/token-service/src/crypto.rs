//! Random material for token keys and workspace signing keys.
//!
//! All randomness comes from `ring::rand::SystemRandom` (OS CSPRNG).

use crate::errors::TokenError;
use ring::rand::{SecureRandom, SystemRandom};

/// Length of a token key in bytes (256 bits).
pub const TOKEN_KEY_BYTES: usize = 32;

/// Length of a workspace signing key in bytes (256 bits).
pub const SIGNING_KEY_BYTES: usize = 32;

/// Prefix applied to signing keys so they are recognizable in secret scanners.
const SIGNING_KEY_PREFIX: &str = "sk_";

fn generate_random_bytes<const N: usize>() -> Result<[u8; N], TokenError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; N];

    rng.fill(&mut bytes).map_err(|e| {
        tracing::error!(target: "token.crypto", error = %e, "Failed to generate random bytes");
        TokenError::Internal
    })?;

    Ok(bytes)
}

/// Generate a new bearer key for a token (hex encoded).
pub fn generate_token_key() -> Result<String, TokenError> {
    let bytes = generate_random_bytes::<TOKEN_KEY_BYTES>()?;
    Ok(hex::encode(bytes))
}

/// Generate a new workspace signing key.
pub fn generate_signing_key() -> Result<String, TokenError> {
    let bytes = generate_random_bytes::<SIGNING_KEY_BYTES>()?;
    Ok(format!("{}{}", SIGNING_KEY_PREFIX, hex::encode(bytes)))
}
