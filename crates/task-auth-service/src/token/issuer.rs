//! Access/refresh token pair issuance.
//!
//! Nothing is persisted: a pair is two signed tokens sharing a key and
//! subject, differing in lifetime and claims.

use crate::config::Config;
use crate::crypto::SigningKey;
use crate::errors::AuthError;
use crate::observability::metrics::record_token_issuance;
use crate::token::claims::Claims;
use crate::token::codec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Tokens returned by a successful login.
///
/// Lifetimes are reported in milliseconds, exactly as configured.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(rename = "expires_in_ml")]
    pub access_expires_in_ms: u64,
    pub refresh_token: String,
    #[serde(rename = "refresh_expires_token_ml")]
    pub refresh_expires_in_ms: u64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("access_expires_in_ms", &self.access_expires_in_ms)
            .field("refresh_token", &"[REDACTED]")
            .field("refresh_expires_in_ms", &self.refresh_expires_in_ms)
            .finish()
    }
}

pub struct TokenIssuer {
    key: Arc<SigningKey>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(key: Arc<SigningKey>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            key,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(key: Arc<SigningKey>, config: &Config) -> Self {
        Self::new(key, config.access_token_ttl, config.refresh_token_ttl)
    }

    /// Issue an access/refresh pair for `subject` at `now`.
    ///
    /// `extra` lands on the access token only; the refresh token carries the
    /// subject and timestamps alone.
    #[instrument(skip_all)]
    pub fn issue(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        now: i64,
    ) -> Result<TokenPair, AuthError> {
        let start = Instant::now();
        let result = self.build_pair(subject, extra, now);

        let status = if result.is_ok() { "success" } else { "error" };
        record_token_issuance(status, start.elapsed());

        result
    }

    fn build_pair(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        now: i64,
    ) -> Result<TokenPair, AuthError> {
        let access_claims =
            Claims::new(subject, now, expiry(now, self.access_ttl)?).with_extra(extra);
        let refresh_claims = Claims::new(subject, now, expiry(now, self.refresh_ttl)?);

        let access_token = codec::encode(&access_claims, &self.key)?;
        let refresh_token = codec::encode(&refresh_claims, &self.key)?;

        tracing::debug!(
            target: "auth.token.issuer",
            iat = now,
            access_exp = access_claims.exp,
            refresh_exp = refresh_claims.exp,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            access_expires_in_ms: millis(self.access_ttl),
            refresh_token,
            refresh_expires_in_ms: millis(self.refresh_ttl),
        })
    }
}

fn expiry(now: i64, ttl: Duration) -> Result<i64, AuthError> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| {
            tracing::error!(target: "auth.token.issuer", "Token expiry overflows timestamp range");
            AuthError::Internal
        })
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}
