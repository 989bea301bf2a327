//! Structural JWT helpers shared by the task API services.
//!
//! These checks run BEFORE any base64 decoding or signature work:
//! - Size limit for DoS prevention
//! - Compact serialization shape (`header.payload.signature`)
//! - `Authorization: Bearer <token>` header parsing
//!
//! Error messages are intentionally generic. Details are logged at debug
//! level under the `common.jwt` target.

use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical access tokens issued by the auth service are 200-400 bytes.
/// Anything larger than this is rejected before base64 decoding or HMAC
/// computation so oversized headers cannot be used to burn CPU or memory.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Scheme prefix for bearer credentials in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Errors raised by the structural checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtStructureError {
    /// Token size exceeds [`MAX_JWT_SIZE_BYTES`].
    #[error("The access token is invalid")]
    TokenTooLarge,

    /// Token is not three non-empty dot-separated segments.
    #[error("The access token is invalid")]
    MalformedToken,
}

/// Enforce the size limit and the three-segment shape.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` if there are not exactly three non-empty segments
pub fn check_token_structure(token: &str) -> Result<(), JwtStructureError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtStructureError::TokenTooLarge);
    }

    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
        return Err(JwtStructureError::MalformedToken);
    };

    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        tracing::debug!(target: "common.jwt", "Token rejected: empty JWT segment");
        return Err(JwtStructureError::MalformedToken);
    }

    Ok(())
}

/// Extract the token from an `Authorization` header value.
///
/// Returns `None` when the value does not use the `Bearer` scheme or the
/// credential after the prefix is blank. Callers decide whether a missing
/// token is anonymous access or an error.
#[must_use]
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
