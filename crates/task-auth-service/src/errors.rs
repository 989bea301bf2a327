//! Auth service error types.
//!
//! Every error maps to a fixed HTTP status through the `IntoResponse` impl.
//! Messages returned to clients are generic; the underlying cause is logged
//! server-side.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Challenge sent with every 401 response.
pub const WWW_AUTHENTICATE_CHALLENGE: &str =
    "Bearer realm=\"task-api\", error=\"invalid_token\"";

/// Auth service error type.
///
/// Status mapping:
/// - MalformedToken, BadSignature, Revoked, AlreadyExpired, PrincipalNotFound,
///   InvalidRequest: 400 Bad Request
/// - Expired, SubjectMismatch, InvalidCredentials, Unauthenticated: 401
///   Unauthorized
/// - DirectoryUnavailable: 503 Service Unavailable
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token signature verification failed")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Token subject does not match the resolved principal")]
    SubjectMismatch,

    #[error("Token is already expired")]
    AlreadyExpired,

    #[error("Principal no longer exists")]
    PrincipalNotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("User directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MalformedToken
            | AuthError::BadSignature
            | AuthError::Revoked
            | AuthError::AlreadyExpired
            | AuthError::PrincipalNotFound
            | AuthError::InvalidRequest(_) => 400,
            AuthError::Expired
            | AuthError::SubjectMismatch
            | AuthError::InvalidCredentials
            | AuthError::Unauthenticated => 401,
            AuthError::DirectoryUnavailable(_) => 503,
            AuthError::Internal => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AuthError::MalformedToken | AuthError::BadSignature | AuthError::SubjectMismatch => {
                ("INVALID_TOKEN", "The access token is invalid".to_string())
            }
            AuthError::Expired => ("TOKEN_EXPIRED", "The access token has expired".to_string()),
            AuthError::Revoked => (
                "TOKEN_REVOKED",
                "The access token has been revoked".to_string(),
            ),
            AuthError::AlreadyExpired => (
                "TOKEN_ALREADY_EXPIRED",
                "The token is already expired".to_string(),
            ),
            AuthError::PrincipalNotFound => (
                "PRINCIPAL_NOT_FOUND",
                "The token principal no longer exists".to_string(),
            ),
            AuthError::InvalidCredentials => (
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            AuthError::Unauthenticated => {
                ("UNAUTHENTICATED", "Authentication is required".to_string())
            }
            AuthError::InvalidRequest(reason) => ("BAD_REQUEST", reason.clone()),
            AuthError::DirectoryUnavailable(reason) => {
                tracing::warn!(target: "auth.availability", reason = %reason, "User directory unavailable");
                (
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            AuthError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_CHALLENGE),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DirectoryUnavailable(err.to_string())
    }
}
