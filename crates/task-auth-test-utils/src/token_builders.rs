//! Builder patterns for test data construction
//!
//! Produces signed tokens the issuer would never hand out: expired,
//! foreign-signed, for unknown subjects, and so on.

use chrono::Utc;
use serde_json::{Map, Value};
use task_auth_service::crypto::SigningKey;
use task_auth_service::token::{codec, Claims};

/// Builder for test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("alice")
///     .expires_in(-60)
///     .sign(&test_signing_key());
/// ```
pub struct TestTokenBuilder {
    sub: String,
    iat: i64,
    exp: i64,
    extra: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Subject `test-subject`, issued now, valid for an hour.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: "test-subject".to_string(),
            iat: now,
            exp: now + 3600,
            extra: Map::new(),
        }
    }

    pub fn for_user(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    /// Set `exp` relative to the current time. Negative values give an
    /// already expired token.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() + seconds;
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn with_claim(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn claims(self) -> Claims {
        Claims::new(self.sub, self.iat, self.exp).with_extra(self.extra)
    }

    pub fn sign(self, key: &SigningKey) -> String {
        codec::encode(&self.claims(), key).expect("test token encodes")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
