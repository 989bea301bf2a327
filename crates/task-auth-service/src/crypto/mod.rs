//! Key material and hashing primitives.
//!
//! - [`SigningKey`]: HMAC-SHA256 key derived from the configured base64 secret
//! - bcrypt password verification with a constant-work path for unknown users
//! - SHA-256 token digests used as revocation cache keys

use crate::config::ConfigError;
use crate::errors::AuthError;
use base64::{engine::general_purpose, Engine as _};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{DecodingKey, EncodingKey};
use sha2::{Digest, Sha256};
use std::fmt;

/// Minimum decoded secret length. HMAC-SHA256 keys shorter than the hash
/// output weaken the MAC.
pub const MIN_SECRET_BYTES: usize = 32;

/// Bcrypt hash verified when the username is unknown, so a login attempt
/// costs the same whether or not the account exists.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Symmetric signing key, held for the lifetime of the process.
///
/// Built once at startup; construction failures are fatal.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &"HS256")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SigningKey {
    /// Decode a standard-alphabet base64 secret into an HMAC key.
    ///
    /// # Errors
    ///
    /// - `InvalidSigningSecret` if the value is blank or not valid base64
    /// - `WeakSigningSecret` if it decodes to fewer than [`MIN_SECRET_BYTES`]
    pub fn from_base64_secret(secret: &SecretString) -> Result<Self, ConfigError> {
        let encoded = secret.expose_secret().trim();
        if encoded.is_empty() {
            return Err(ConfigError::InvalidSigningSecret(
                "secret is empty".to_string(),
            ));
        }

        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| ConfigError::InvalidSigningSecret(format!("not valid base64: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    /// Build a key from raw secret bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSigningSecret {
                min: MIN_SECRET_BYTES,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Hash a password with bcrypt.
///
/// Used by provisioning and test fixtures; login only verifies.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!(target: "auth.crypto", error = %e, "Password hashing failed");
        AuthError::Internal
    })
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| {
        tracing::error!(target: "auth.crypto", error = %e, "Password verification failed");
        AuthError::Internal
    })
}

/// SHA-256 digest of a token, hex encoded.
///
/// Revocation entries are keyed by this digest so the cache never holds
/// usable bearer credentials.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
