//! Custom test assertions for issued tokens.
//!
//! Inspect the payload without verifying the signature, the way a client
//! would.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(default)]
    roles: Vec<String>,
}

/// Assertions on a compact-serialized token.
///
/// # Example
/// ```rust,ignore
/// pair.access_token
///     .assert_valid_jwt()
///     .assert_for_subject("alice")
///     .assert_has_role("ROLE_USER")
///     .assert_lifetime_secs(60);
/// ```
pub trait TokenAssertions {
    /// Three segments, HS256 header with `typ` JWT.
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_for_subject(&self, subject: &str) -> &Self;

    fn assert_has_role(&self, role: &str) -> &Self;

    fn assert_has_no_roles(&self) -> &Self;

    /// `exp - iat` equals `seconds`.
    fn assert_lifetime_secs(&self, seconds: i64) -> &Self;
}

fn segment<T: serde::de::DeserializeOwned>(token: &str, index: usize) -> T {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("token has no segment {index}"));
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("segment {index} is not base64url: {e}"));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("segment {index} is not the expected JSON: {e}"))
}

fn claims(token: &str) -> JwtClaims {
    segment(token, 1)
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );
        let header: JwtHeader = segment(self, 0);
        assert_eq!(header.alg, "HS256");
        assert_eq!(header.typ, "JWT");
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        assert_eq!(claims(self).sub, subject, "unexpected token subject");
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let roles = claims(self).roles;
        assert!(
            roles.iter().any(|r| r == role),
            "expected role {role}, token has {roles:?}"
        );
        self
    }

    fn assert_has_no_roles(&self) -> &Self {
        let roles = claims(self).roles;
        assert!(roles.is_empty(), "expected no roles, token has {roles:?}");
        self
    }

    fn assert_lifetime_secs(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.exp - claims.iat, seconds, "unexpected token lifetime");
        self
    }
}
