//! Login and logout.
//!
//! Login checks credentials and issues a token pair. Logout revokes the
//! presented bearer token for the rest of its lifetime.

use crate::auth::PrincipalResolver;
use crate::errors::AuthError;
use crate::observability::{hash_for_correlation, metrics::record_login};
use crate::revocation::RevocationStore;
use crate::token::{claims::ROLES_CLAIM, TokenIssuer, TokenPair, TokenValidator};
use common::jwt::extract_bearer_token;
use serde_json::{Map, Value};
use tracing::instrument;

/// Authenticate `username`/`password` and issue a token pair.
///
/// The access token carries the principal's roles.
///
/// # Errors
///
/// - `InvalidRequest` for a blank username or password
/// - `InvalidCredentials` for an unknown user or wrong password
/// - `DirectoryUnavailable` if the directory cannot answer
#[instrument(skip_all, name = "auth.session.login")]
pub async fn login(
    resolver: &PrincipalResolver,
    issuer: &TokenIssuer,
    username: &str,
    password: &str,
    now: i64,
) -> Result<TokenPair, AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidRequest(
            "username must not be blank".to_string(),
        ));
    }
    if password.trim().is_empty() {
        return Err(AuthError::InvalidRequest(
            "password must not be blank".to_string(),
        ));
    }

    let principal = match resolver.authenticate_credentials(username, password).await {
        Ok(principal) => principal,
        Err(e) => {
            let status = if e == AuthError::InvalidCredentials {
                "invalid_credentials"
            } else {
                "error"
            };
            record_login(status);
            return Err(e);
        }
    };

    let mut extra = Map::new();
    extra.insert(
        ROLES_CLAIM.to_string(),
        Value::Array(
            principal
                .authorities
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        ),
    );

    let pair = issuer.issue(&principal.username, extra, now).inspect_err(|_| {
        record_login("error");
    })?;

    record_login("success");
    tracing::info!(
        target: "auth.session",
        user = %hash_for_correlation(&principal.username),
        "Login succeeded"
    );

    Ok(pair)
}

/// Revoke the bearer token in `authorization`.
///
/// Repeating a logout with a still-valid token succeeds again.
///
/// # Errors
///
/// - `Unauthenticated` when no bearer token is presented
/// - `MalformedToken` / `BadSignature` for tokens this service did not sign
/// - `AlreadyExpired` when the token has already expired
#[instrument(skip_all, name = "auth.session.logout")]
pub fn logout(
    validator: &TokenValidator,
    revocations: &dyn RevocationStore,
    authorization: Option<&str>,
    now: i64,
) -> Result<(), AuthError> {
    let token = authorization
        .and_then(extract_bearer_token)
        .ok_or(AuthError::Unauthenticated)?;

    let claims = validator.verify_signature(token)?;

    revocations.revoke(token, claims.exp, now)?;

    tracing::info!(
        target: "auth.session",
        user = %hash_for_correlation(&claims.sub),
        "Logout succeeded"
    );

    Ok(())
}
