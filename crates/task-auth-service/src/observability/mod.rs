//! Observability for the auth service.
//!
//! Instrumented functions use `#[instrument(skip_all)]` and add fields
//! explicitly. Field rules:
//! - **SAFE**: enums, stage names, timestamps
//! - **HASHED**: usernames, via [`hash_for_correlation`]
//! - **NEVER**: tokens, passwords, the signing secret

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Lets log lines about the same username be joined without writing the
/// username itself. Not a secret-protecting hash.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Structure or signature failures
    Invalid,
    /// Token past its expiry
    Expired,
    /// Token on the revocation list
    Revoked,
    /// Subject mismatch or unknown principal
    Principal,
    /// Credential and request failures
    Authentication,
    /// Directory or internal failures
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Invalid => "invalid",
            ErrorCategory::Expired => "expired",
            ErrorCategory::Revoked => "revoked",
            ErrorCategory::Principal => "principal",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::MalformedToken | AuthError::BadSignature => ErrorCategory::Invalid,
            AuthError::Expired | AuthError::AlreadyExpired => ErrorCategory::Expired,
            AuthError::Revoked => ErrorCategory::Revoked,
            AuthError::SubjectMismatch | AuthError::PrincipalNotFound => ErrorCategory::Principal,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::InvalidRequest(_) => ErrorCategory::Authentication,
            AuthError::DirectoryUnavailable(_) | AuthError::Internal => ErrorCategory::Internal,
        }
    }
}
