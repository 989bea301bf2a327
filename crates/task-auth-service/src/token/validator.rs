//! Token validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. Structure and signature (`MalformedToken`, `BadSignature`)
//! 2. Expiry against `now` (`Expired`)
//! 3. Revocation list (`Revoked`)
//! 4. Subject against the expected username (`SubjectMismatch`)
//!
//! Steps 1-3 are [`TokenValidator::verify`]; step 4 is
//! [`TokenValidator::check_subject`], kept separate so the request filter
//! can resolve the principal in between.

use crate::crypto::SigningKey;
use crate::errors::AuthError;
use crate::observability::{metrics::record_token_validation, ErrorCategory};
use crate::revocation::RevocationStore;
use crate::token::claims::Claims;
use crate::token::codec;
use std::sync::Arc;
use tracing::instrument;

pub struct TokenValidator {
    key: Arc<SigningKey>,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenValidator {
    pub fn new(key: Arc<SigningKey>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { key, revocations }
    }

    /// Run signature, expiry and revocation checks.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let result = self.verify_inner(token, now);
        record_outcome(&result);
        result
    }

    fn verify_inner(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = codec::decode(token, &self.key, now)?;

        if self.revocations.is_revoked(token, now) {
            tracing::debug!(target: "auth.token.validator", "Token rejected: revoked");
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// The token's subject must name the principal it is used for.
    pub fn check_subject(claims: &Claims, expected_username: &str) -> Result<(), AuthError> {
        if claims.sub != expected_username {
            tracing::debug!(target: "auth.token.validator", "Token rejected: subject mismatch");
            return Err(AuthError::SubjectMismatch);
        }
        Ok(())
    }

    /// All four checks, in order.
    #[instrument(skip_all)]
    pub fn validate(
        &self,
        token: &str,
        expected_username: &str,
        now: i64,
    ) -> Result<Claims, AuthError> {
        let claims = self.verify(token, now)?;
        Self::check_subject(&claims, expected_username)?;
        Ok(claims)
    }

    /// Signature-only check for callers that handle expiry themselves.
    pub fn verify_signature(&self, token: &str) -> Result<Claims, AuthError> {
        codec::verify(token, &self.key)
    }
}

fn record_outcome(result: &Result<Claims, AuthError>) {
    match result {
        Ok(_) => record_token_validation("success", None),
        Err(e) => record_token_validation("error", Some(ErrorCategory::from(e).as_str())),
    }
}
