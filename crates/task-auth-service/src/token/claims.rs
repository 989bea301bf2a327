//! Token claims.
//!
//! `sub`, `iat` and `exp` are fixed fields; everything else travels in the
//! flattened `extra` map. The subject is redacted in Debug output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Claim names owned by the fixed fields. Never allowed in `extra`.
pub const RESERVED_CLAIMS: &[&str] = &["sub", "iat", "exp"];

/// Extra claim carrying the principal's role labels on access tokens.
pub const ROLES_CLAIM: &str = "roles";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username). Redacted in Debug output.
    pub sub: String,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Only reachable through [`Claims::with_extra`], which keeps reserved
    /// names out.
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Claims {
    pub fn new(sub: impl Into<String>, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.into(),
            iat,
            exp,
            extra: Map::new(),
        }
    }

    /// Attach extra claims. Keys that collide with a reserved claim are dropped.
    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra
            .into_iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .collect();
        self
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// A token is expired once `now` reaches `exp`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Role labels from the `roles` claim. Non-string entries are skipped.
    pub fn roles(&self) -> Vec<&str> {
        self.extra
            .get(ROLES_CLAIM)
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
