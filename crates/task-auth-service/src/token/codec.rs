//! Compact JWS codec (HS256).
//!
//! Structure and size are checked before any decoding. Signature failures
//! and expiry are reported as distinct errors; expiry is checked by this
//! module against a caller-supplied `now`, never by the JWT library.

use crate::crypto::SigningKey;
use crate::errors::AuthError;
use crate::token::claims::Claims;
use common::jwt::check_token_structure;
use jsonwebtoken::{errors::ErrorKind, Algorithm, Header, Validation};
use tracing::instrument;

/// Sign claims into a compact token.
///
/// Output is deterministic for identical claims and key.
#[instrument(skip_all)]
pub fn encode(claims: &Claims, key: &SigningKey) -> Result<String, AuthError> {
    let header = Header::new(Algorithm::HS256);

    jsonwebtoken::encode(&header, claims, key.encoding()).map_err(|e| {
        tracing::error!(target: "auth.token.codec", error = %e, "Failed to sign token");
        AuthError::Internal
    })
}

/// Verify structure and signature and return the claims. Expiry is NOT checked.
///
/// # Errors
///
/// - `MalformedToken` for oversized tokens, wrong segment count, bad base64
///   or a payload that is not a claims object
/// - `BadSignature` when the MAC does not match or the header names another algorithm
#[instrument(skip_all)]
pub fn verify(token: &str, key: &SigningKey) -> Result<Claims, AuthError> {
    check_token_structure(token).map_err(|_| AuthError::MalformedToken)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;

    let data = jsonwebtoken::decode::<Claims>(token, key.decoding(), &validation)
        .map_err(|e| map_decode_error(e.kind()))?;

    Ok(data.claims)
}

/// Verify a token and check it has not expired at `now`.
///
/// # Errors
///
/// Everything [`verify`] returns, plus `Expired` once `now >= exp`.
#[instrument(skip_all)]
pub fn decode(token: &str, key: &SigningKey, now: i64) -> Result<Claims, AuthError> {
    let claims = verify(token, key)?;

    if claims.is_expired_at(now) {
        tracing::debug!(
            target: "auth.token.codec",
            exp = claims.exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(AuthError::Expired);
    }

    Ok(claims)
}

fn map_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            tracing::debug!(target: "auth.token.codec", error = ?kind, "Token rejected: signature check failed");
            AuthError::BadSignature
        }
        ErrorKind::ExpiredSignature => AuthError::Expired,
        other => {
            tracing::debug!(target: "auth.token.codec", error = ?other, "Token rejected: malformed");
            AuthError::MalformedToken
        }
    }
}
